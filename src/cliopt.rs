use std::net::SocketAddr;
use std::path::PathBuf;

use structopt::StructOpt;

use crate::error::Result;

#[derive(Debug, StructOpt)]
#[structopt(name = "measurelog", about = "measurelog command line arguments")]
pub struct CliOpt {
    #[structopt(
        long = "listen",
        short = "l",
        default_value = "127.0.0.1:8080",
        parse(try_from_str = parse_listen_addr)
    )]
    pub listen: SocketAddr,

    #[structopt(long = "data-dir", short = "d", default_value = "data", parse(from_os_str))]
    pub data_dir: PathBuf,

    /// Public address used in dashboard links sent to users.
    #[structopt(long = "base-url", short = "b", default_value = "http://localhost:8080")]
    pub base_url: String,

    #[structopt(long = "chart-width", default_value = "800")]
    pub chart_width: u32,

    #[structopt(long = "chart-height", default_value = "400")]
    pub chart_height: u32,
}

impl CliOpt {
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!("base URL '{}' must be an http(s) URL", self.base_url).into());
        }
        if self.chart_width == 0 || self.chart_height == 0 {
            return Err("chart dimensions must be positive".into());
        }
        Ok(())
    }
}

fn parse_listen_addr(s: &str) -> Result<SocketAddr> {
    s.parse::<SocketAddr>()
        .map_err(|e| ("listen address parsing failed", e).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() -> Result<()> {
        let opt = CliOpt::from_iter(&["measurelog"]);
        assert_eq!(opt.listen, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(opt.data_dir, PathBuf::from("data"));
        assert_eq!(opt.chart_width, 800);
        assert_eq!(opt.chart_height, 400);
        opt.validate()
    }

    #[test]
    fn test_overrides() -> Result<()> {
        let opt = CliOpt::from_iter(&[
            "measurelog",
            "--listen",
            "0.0.0.0:9000",
            "-d",
            "/var/lib/measurelog",
            "--base-url",
            "https://m.example.org",
        ]);
        assert_eq!(opt.listen.port(), 9000);
        assert_eq!(opt.data_dir, PathBuf::from("/var/lib/measurelog"));
        opt.validate()
    }

    #[test]
    fn test_bad_listen_addr() {
        assert!(CliOpt::from_iter_safe(&["measurelog", "--listen", "localhost"]).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let opt = CliOpt::from_iter(&["measurelog", "--base-url", "example.org"]);
        match opt.validate() {
            Err(e) => assert_eq!(e.message(), "base URL 'example.org' must be an http(s) URL"),
            Ok(_) => panic!("validation should have failed"),
        }
    }
}
