use clap::{ArgAction, Parser};
use std::net::IpAddr;
use std::path::PathBuf;

const VERSION_INFO: &str = env!("PFGEN_BUILD_VERSION");

#[derive(Parser, Debug)]
#[command(name = "pfgen")]
#[command(about = "iptables port forwarding rule generator", long_about = None, version = VERSION_INFO)]
pub struct Cli {
    /// The YAML file containing forwarding rules
    pub rules_file: PathBuf,

    /// Destination IPv4 or IPv6 address to forward the ports to
    pub destination: IpAddr,

    /// Source interface to match inbound traffic on (all interfaces if omitted)
    pub source_interface: Option<String>,

    /// Increase message verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
