pub mod cli;
pub mod iptables;
pub mod rules;
