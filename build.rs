use std::env;

fn main() {
    // MAVLink identity stamped on every outgoing frame.
    // Used by TelemetryConfig::from_build_env() when no runtime config is supplied.

    // System ID
    if let Ok(system_id) = env::var("FC_MAV_SYSTEM_ID") {
        println!("cargo:rustc-env=FC_MAV_SYSTEM_ID={}", system_id);
        println!(
            "cargo:warning=Using FC_MAV_SYSTEM_ID from environment: {}",
            system_id
        );
    } else {
        println!("cargo:rustc-env=FC_MAV_SYSTEM_ID=1");
    }

    // Component ID
    if let Ok(component_id) = env::var("FC_MAV_COMPONENT_ID") {
        println!("cargo:rustc-env=FC_MAV_COMPONENT_ID={}", component_id);
        println!(
            "cargo:warning=Using FC_MAV_COMPONENT_ID from environment: {}",
            component_id
        );
    } else {
        println!("cargo:rustc-env=FC_MAV_COMPONENT_ID=1");
    }

    println!("cargo:rerun-if-env-changed=FC_MAV_SYSTEM_ID");
    println!("cargo:rerun-if-env-changed=FC_MAV_COMPONENT_ID");
}
