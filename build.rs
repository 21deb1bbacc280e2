use std::{env, fs, path::PathBuf};

fn main() {
    // 1) Stage memory.x for the Pico 1W target
    let target = env::var("TARGET").unwrap();
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    if target.starts_with("thumbv6m") {
        let memory_x = fs::read_to_string("memory.x").expect("Failed to read memory.x");
        let dest = out_dir.join("memory.x");
        fs::write(&dest, memory_x).expect("Failed to write memory.x");
        println!("cargo:rustc-link-search={}", out_dir.display());
        println!("cargo:rerun-if-changed=memory.x");
    }

    // 2) Load optional env files (still supported for convenience)
    let _ = dotenvy::from_filename(".env");
    load_home_env(".pico.env");
    load_home_env(".env");

    // 3) Provide fallbacks so the firmware can compile without .env.
    //    The countdown defaults mirror the board this was first built for:
    //    Europe/Budapest, target 2026-04-12 06:00 local.
    let wifi_ssid = env_or_default("WIFI_SSID", "");
    let wifi_pass = env_or_default("WIFI_PASS", "");
    let target_datetime = env_or_default("TARGET_DATETIME", "2026-04-12T06:00:00");
    let target_label = env_or_default("TARGET_LABEL", &default_label(&target_datetime));
    let tz_spec = env_or_default("TZ_SPEC", "CET-1CEST,M3.5.0/2,M10.5.0/3");
    let ntp_servers = env_or_default("NTP_SERVERS", "pool.ntp.org,time.nist.gov");
    let print_interval = env_or_default("PRINT_INTERVAL_SECS", "60");
    let resync_interval = env_or_default("RESYNC_INTERVAL_SECS", "21600");
    let sync_grace = env_or_default("SYNC_GRACE_SECS", "15");
    let display_mode = env_or_default("DISPLAY_MODE_SECS", "15");

    // Warn only if Wi-Fi was explicitly enabled but credentials are missing.
    if env::var_os("CARGO_FEATURE_WIFI").is_some() {
        if wifi_ssid.is_empty() {
            println!(
                "cargo:warning=WIFI feature enabled but WIFI_SSID is not set; using empty string"
            );
        }
        if wifi_pass.is_empty() {
            println!(
                "cargo:warning=WIFI feature enabled but WIFI_PASS is not set; using empty string"
            );
        }
    }

    // 4) Expose as compile-time constants
    println!("cargo:rustc-env=WIFI_SSID={wifi_ssid}");
    println!("cargo:rustc-env=WIFI_PASS={wifi_pass}");
    println!("cargo:rustc-env=TARGET_DATETIME={target_datetime}");
    println!("cargo:rustc-env=TARGET_LABEL={target_label}");
    println!("cargo:rustc-env=TZ_SPEC={tz_spec}");
    println!("cargo:rustc-env=NTP_SERVERS={ntp_servers}");
    println!("cargo:rustc-env=PRINT_INTERVAL_SECS={print_interval}");
    println!("cargo:rustc-env=RESYNC_INTERVAL_SECS={resync_interval}");
    println!("cargo:rustc-env=SYNC_GRACE_SECS={sync_grace}");
    println!("cargo:rustc-env=DISPLAY_MODE_SECS={display_mode}");

    // Optional: don't rebuild unless these change
    println!("cargo:rerun-if-env-changed=WIFI_SSID");
    println!("cargo:rerun-if-env-changed=WIFI_PASS");
    println!("cargo:rerun-if-env-changed=TARGET_DATETIME");
    println!("cargo:rerun-if-env-changed=TARGET_LABEL");
    println!("cargo:rerun-if-env-changed=TZ_SPEC");
    println!("cargo:rerun-if-env-changed=NTP_SERVERS");
    println!("cargo:rerun-if-env-changed=PRINT_INTERVAL_SECS");
    println!("cargo:rerun-if-env-changed=RESYNC_INTERVAL_SECS");
    println!("cargo:rerun-if-env-changed=SYNC_GRACE_SECS");
    println!("cargo:rerun-if-env-changed=DISPLAY_MODE_SECS");
    println!("cargo:rerun-if-changed=.env");
}

fn load_home_env(file: &str) {
    let home = match env::var_os("USERPROFILE").or_else(|| env::var_os("HOME")) {
        Some(path) => PathBuf::from(path),
        None => return,
    };
    let path = home.join(file);
    let _ = dotenvy::from_path(&path);
}

fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Human-readable report label derived from the ISO datetime:
/// "2026-04-12T06:00:00" becomes "2026-04-12 06:00".
fn default_label(target_datetime: &str) -> String {
    let spaced = target_datetime.replacen('T', " ", 1);
    match spaced.rfind(':') {
        Some(last_colon) if spaced.matches(':').count() == 2 => spaced[..last_colon].to_string(),
        _ => spaced,
    }
}
