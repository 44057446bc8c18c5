use std::env;
use std::process;

use cloudvfs::{Drive, StoreConfig};
use cloudvfs::store::CloudinaryStore;
use tracing_subscriber::{fmt, EnvFilter};

pub fn usage_and_exit(usage: &str) -> ! {
    eprintln!("{usage}");
    process::exit(1);
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cloudvfs=debug"));
    fmt().with_env_filter(filter).with_target(false).init();
}

pub struct ArgParser {
    args: Vec<String>,
    usage: &'static str,
}

impl ArgParser {
    pub fn new(usage: &'static str) -> Self {
        let args: Vec<String> = env::args().skip(1).collect();

        if args.iter().any(|a| a == "--help" || a == "-h") {
            println!("{usage}");
            process::exit(0);
        }

        Self { args, usage }
    }

    pub fn take_value(&mut self, names: &[&str]) -> Option<String> {
        let mut i = 0;
        while i < self.args.len() {
            if names.contains(&self.args[i].as_str()) {
                let value = self.args.get(i + 1).cloned();
                if value.is_none() {
                    usage_and_exit(self.usage);
                }
                self.args.drain(i..=i + 1);
                return value;
            }
            i += 1;
        }
        None
    }

    pub fn remaining(self) -> Vec<String> {
        self.args
    }
}

/// Parsed command line: environment config plus positional arguments.
pub struct Invocation {
    pub config: StoreConfig,
    #[allow(dead_code)] // Only some demos take options.
    pub options: Vec<(String, String)>,
    pub positionals: Vec<String>,
}

/// Read config from the environment, apply `--root`/`--proxy` overrides and collect
/// positionals.
pub fn parse_invocation(usage: &'static str, option_names: &[&str]) -> Invocation {
    init_tracing();
    let mut parser = ArgParser::new(usage);

    let mut config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            usage_and_exit(usage);
        }
    };
    if let Some(root) = parser.take_value(&["--root"]) {
        config.root_folder = root.trim_matches('/').to_string();
    }
    if let Some(proxy) = parser.take_value(&["--proxy"]) {
        config.proxy = Some(proxy);
    }

    let mut options = Vec::new();
    for name in option_names {
        if let Some(value) = parser.take_value(&[*name]) {
            options.push((name.to_string(), value));
        }
    }

    Invocation {
        config,
        options,
        positionals: parser.remaining(),
    }
}

impl Invocation {
    pub fn connect(&self) -> cloudvfs::Result<Drive<CloudinaryStore>> {
        Drive::connect(&self.config)
    }

    #[allow(dead_code)]
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}
