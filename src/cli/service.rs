//! Service subcommand implementation.

use crate::error::CliResult;
use crate::services;
use clap::Parser;

/// Look up the service label for one or more ports.
#[derive(Parser, Debug)]
pub struct ServiceCommand {
    /// Port numbers to look up
    #[arg(value_name = "PORT", required = true)]
    pub ports: Vec<u16>,
}

impl ServiceCommand {
    pub fn execute(&self) -> CliResult<()> {
        for line in self.lines() {
            println!("{}", line);
        }
        Ok(())
    }

    fn lines(&self) -> Vec<String> {
        self.ports
            .iter()
            .map(|&port| format!("{:>5}  {}", port, services::classify(port)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines() {
        let cmd = ServiceCommand {
            ports: vec![22, 31337],
        };
        assert_eq!(cmd.lines(), vec!["   22  SSH", "31337  Unknown"]);
    }
}
