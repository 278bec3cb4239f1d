use adaptive_signal_core::controller::config::{IntersectionConfig, ProviderKind};
use adaptive_signal_core::controller::controller::TrafficController;
use adaptive_signal_core::verbose::{set_verbose_level, VerboseLevel};
use std::env;
use std::process;

// cargo run --bin run_controller -- --headless --provider mock --hz 10 --max-ticks 600 --log-level main
pub fn main() {
    let mut provider = "mock".to_string();
    let mut hz = 10.0_f64;
    let mut max_ticks: Option<u64> = None;
    let mut log_level = VerboseLevel::Main;
    let mut headless = false;

    let args: Vec<String> = env::args().skip(1).collect();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--headless" => headless = true,
            "--provider" => {
                i += 1;
                provider = args.get(i).cloned().unwrap_or_else(|| usage("--provider"));
            }
            "--hz" => {
                i += 1;
                hz = args
                    .get(i)
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(|| usage("--hz"));
            }
            "--max-ticks" => {
                i += 1;
                max_ticks = Some(
                    args.get(i)
                        .and_then(|v| v.parse().ok())
                        .unwrap_or_else(|| usage("--max-ticks")),
                );
            }
            "--log-level" => {
                i += 1;
                log_level = match args.get(i).map(|s| s.as_str()) {
                    Some("none") => VerboseLevel::None,
                    Some("main") => VerboseLevel::Main,
                    Some("additional") => VerboseLevel::Additional,
                    Some("detailed") => VerboseLevel::Detailed,
                    Some("all") => VerboseLevel::All,
                    _ => usage("--log-level"),
                };
            }
            other => {
                eprintln!("Unknown flag: {}", other);
                process::exit(2);
            }
        }
        i += 1;
    }

    set_verbose_level(log_level);

    let mut config = IntersectionConfig::default();
    config.controller_hz = hz;
    config.vision.provider_kind = match ProviderKind::from_str(&provider) {
        Ok(kind) => kind,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(2);
        }
    };

    let mut controller = match TrafficController::new(config) {
        Ok(controller) => controller,
        Err(err) => {
            eprintln!("Controller setup failed: {}", err);
            process::exit(1);
        }
    };

    if !headless {
        // Without a dashboard attached, print the status snapshot once
        // per second as a simple observer
        let ticks_per_second = hz.max(1.0) as u64;
        let mut counter: u64 = 0;
        controller.add_observer(Box::new(move |status| {
            counter += 1;
            if counter % ticks_per_second == 0 {
                println!("{}", status.to_json());
            }
        }));
    }

    controller.run(max_ticks);
    controller.teardown();
}

fn usage(flag: &str) -> ! {
    eprintln!("Missing or invalid value for {}", flag);
    eprintln!(
        "Usage: run_controller [--headless] [--provider mock|external] [--hz N] [--max-ticks N] [--log-level none|main|additional|detailed|all]"
    );
    process::exit(2);
}
