use linktap_api::driver::DriverConfig;
use serde_derive::Deserialize;
use std::env;
use tracing::Level;

const CFG_FILE: &str = "linktap.toml";

#[derive(Deserialize, Default)]
pub struct Config {
    log_level: Option<String>,
    #[serde(default)]
    pub bridge: DriverConfig,
    #[serde(default)]
    pub tap: Vec<DriverConfig>,
}

impl Config {
    pub fn get_log_level(&self) -> Level {
        let v = self.log_level.as_deref().unwrap_or("warn");

        match v {
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::WARN,
        }
    }

    // The number of '-v' options raises the log level.

    fn apply_verbosity(&mut self, count: u8) {
        match count {
            0 => (),
            1 => self.log_level = Some(String::from("info")),
            2 => self.log_level = Some(String::from("debug")),
            _ => self.log_level = Some(String::from("trace")),
        }
    }
}

struct CmdLine {
    config: Option<String>,
    verbosity: u8,
    print_cfg: bool,
}

fn from_cmdline() -> CmdLine {
    use clap::{crate_version, Arg, ArgAction, Command};

    // Define the command line arguments.

    let matches = Command::new("LinkTap Valve Controller")
        .version(crate_version!())
        .about("Monitors and controls LinkTap irrigation valves.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Specifies the configuration file")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Sets verbosity of log; can be used more than once")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("print_cfg")
                .long("print-config")
                .help("Displays the configuration and exits")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    CmdLine {
        config: matches.get_one::<String>("config").cloned(),
        verbosity: matches.get_count("verbose"),
        print_cfg: matches.get_flag("print_cfg"),
    }
}

fn parse_config(path: &str, contents: &str) -> Option<Config> {
    match toml::from_str(contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            print!("ERROR: {},\n       ignoring {}\n", e, path);
            None
        }
    }
}

async fn from_file(path: &str) -> Option<Config> {
    use tokio::fs;

    if let Ok(contents) = fs::read(path).await {
        let contents = String::from_utf8_lossy(&contents);

        parse_config(path, &contents)
    } else {
        None
    }
}

// Returns the list of files that could hold the configuration, in the
// order they're searched.

fn search_path(home: Option<String>) -> Vec<String> {
    let mut dirs = vec![String::from("./")];

    // If the user has `HOME` defined, search their home directory,
    // too. The file will be named `.linktap.toml` there.

    if let Some(home) = home {
        dirs.push(format!("{}/.", home))
    }

    // Add other, common configuration areas.

    dirs.push(String::from("/usr/local/etc/"));
    dirs.push(String::from("/usr/pkg/etc/"));
    dirs.push(String::from("/etc/"));

    dirs.into_iter()
        .map(|dir| format!("{}{}", dir, CFG_FILE))
        .collect()
}

async fn find_cfg() -> Config {
    // The first file that is found and can be parsed is used as the
    // configuration.

    for file in search_path(env::var("HOME").ok()) {
        if let Some(cfg) = from_file(&file).await {
            return cfg;
        }
    }
    Config::default()
}

fn dump_config(cfg: &Config) {
    println!("Configuration:");
    println!("    log level: {}\n", cfg.get_log_level());

    println!(
        "Driver: {} -- {}\n",
        linktap_drv_tap::NAME,
        linktap_drv_tap::SUMMARY
    );

    println!("Account:");
    match cfg.bridge.get_str("username") {
        Ok(name) => println!("    username: {}", name),
        Err(_) => println!("    No username specified."),
    }
    match cfg.bridge.get_str("url") {
        Ok(url) => println!("    url: {}", url),
        Err(_) => println!("    url: {}", linktap_drv_tap::DEFAULT_URL),
    }
    if let Some(tmo) = cfg.bridge.get("timeout") {
        println!("    timeout: {}", tmo)
    }
    println!();

    println!("Valve configuration:");
    if !cfg.tap.is_empty() {
        for tap in &cfg.tap {
            println!("    cfg: {:?}\n", &**tap)
        }
    } else {
        println!("    No valves specified.");
    }
}

#[tracing::instrument(name = "loading config")]
pub async fn get() -> Option<Config> {
    let cmd = from_cmdline();

    // A configuration file named on the command line has to be
    // usable. Otherwise search the usual places.

    let mut cfg = match cmd.config {
        Some(path) => match from_file(&path).await {
            Some(cfg) => cfg,
            None => {
                println!("ERROR: couldn't load {}", path);
                return None;
            }
        },
        None => find_cfg().await,
    };

    cfg.apply_verbosity(cmd.verbosity);

    if cmd.print_cfg {
        dump_config(&cfg);
        None
    } else {
        Some(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config() {
        // An empty file is a valid, if useless, configuration.

        match toml::from_str::<Config>("") {
            Ok(cfg) => {
                assert_eq!(cfg.get_log_level(), Level::WARN);
                assert!(cfg.bridge.is_empty());
                assert!(cfg.tap.is_empty());
            }
            Err(e) => panic!("TOML parse error: {}", e),
        }

        for (name, level) in [
            ("trace", Level::TRACE),
            ("debug", Level::DEBUG),
            ("info", Level::INFO),
            ("warn", Level::WARN),
            ("loud", Level::WARN),
        ] {
            match toml::from_str::<Config>(&format!("log_level = \"{}\"", name))
            {
                Ok(cfg) => assert_eq!(cfg.get_log_level(), level),
                Err(e) => panic!("TOML parse error: {}", e),
            }
        }

        match toml::from_str::<Config>(
            r#"
log_level = "info"

[bridge]
username = "me"
api_key = "secret"

[[tap]]
name = "front"
gateway_id = "GW"
tap_id = "T1"

[[tap]]
name = "back"
gateway_id = "GW"
tap_id = "T2"
refresh_interval = 120
"#,
        ) {
            Ok(cfg) => {
                assert_eq!(cfg.bridge.get_str("username"), Ok("me".into()));
                assert_eq!(cfg.tap.len(), 2);
                assert_eq!(cfg.tap[1].get_str("tap_id"), Ok("T2".into()));
            }
            Err(e) => panic!("TOML parse error: {}", e),
        }

        assert!(
            toml::from_str::<Config>("bridge = 5").is_err(),
            "TOML parser accepted a non-table bridge"
        );
        assert!(
            toml::from_str::<Config>("[tap]\nname = \"front\"").is_err(),
            "TOML parser accepted a tap that isn't an array"
        );
    }

    #[test]
    fn test_verbosity() {
        let mut cfg = Config::default();

        cfg.apply_verbosity(0);
        assert_eq!(cfg.get_log_level(), Level::WARN);
        cfg.apply_verbosity(1);
        assert_eq!(cfg.get_log_level(), Level::INFO);
        cfg.apply_verbosity(2);
        assert_eq!(cfg.get_log_level(), Level::DEBUG);
        cfg.apply_verbosity(3);
        assert_eq!(cfg.get_log_level(), Level::TRACE);
        cfg.apply_verbosity(9);
        assert_eq!(cfg.get_log_level(), Level::TRACE);
    }

    #[test]
    fn test_search_path() {
        assert_eq!(
            search_path(Some("/home/me".into())),
            vec![
                "./linktap.toml",
                "/home/me/.linktap.toml",
                "/usr/local/etc/linktap.toml",
                "/usr/pkg/etc/linktap.toml",
                "/etc/linktap.toml"
            ]
        );
        assert_eq!(search_path(None).len(), 4);
    }
}
