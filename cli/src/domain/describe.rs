//! Descriptive text for a machine type.
//!
//! Turns the control plane's capability record into the short summary shown
//! by `fleet describe`.

use fleet_common::InstanceTypeInfo;

/// Friendly architecture name.
#[must_use]
pub fn architecture_label(arch: &str) -> &str {
    match arch {
        "x86_64" => "x64",
        "arm64" => "Graviton (Arm)",
        "arm64_mac" => "Apple silicon",
        "x86_64_mac" => "x86 Mac",
        other => other,
    }
}

/// Render the summary for `machine_type`.
#[must_use]
pub fn describe_instance_type(machine_type: &str, info: &InstanceTypeInfo) -> String {
    let architecture = info
        .architectures
        .iter()
        .map(|a| architecture_label(a))
        .collect::<Vec<_>>()
        .join(" / ");
    let clock = info
        .clock_speed_ghz
        .map_or_else(String::new, |ghz| format!(" ({ghz} GHz)"));
    let core_noun = if info.cores > 1 { "cores" } else { "core" };

    let mut lines = vec![
        format!("- a {architecture} architecture."),
        format!("- {} vCPUs{clock}.", info.vcpus),
        format!("- {} {core_noun}.", info.cores),
        format!("- {} threads per core.", info.threads_per_core),
    ];
    if let Some(gpu) = info.gpus.first() {
        lines.push(format!(
            "- {} GPU from {} ({}) with {} MiB memory.",
            gpu.count, gpu.manufacturer, gpu.name, gpu.memory_mib
        ));
    }
    lines.push(format!("- {} MiB memory.", info.memory_mib));
    lines.push(format!("- {} network bandwidth.", info.network_performance));

    format!(
        "A {machine_type} instance has the following characteristics:\n\n{}",
        lines.join("\n")
    )
}
