//! Commands command - print the command lines deploying an environment

use console::style;
use kubecd_core::Environment;
use kubecd_helm::argv::use_context_command;
use kubecd_helm::{HelmArgv, ProcessRunner, ValueResolver, repo_setup_commands};
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;

/// Flags of the `commands` subcommand
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub dry_run: bool,
    pub debug_helm: bool,
    pub diff: bool,
    pub setup: bool,
}

pub fn run(env_file: &Path, releases: &[String], options: Options) -> Result<()> {
    let env = Environment::load(env_file)?;
    let resolver = ValueResolver::new(Arc::new(ProcessRunner));
    let helm = HelmArgv::new(&resolver)
        .dry_run(options.dry_run)
        .debug(options.debug_helm)
        .diff(options.diff);
    let only = (!releases.is_empty()).then_some(releases);

    let mut commands = Vec::new();
    if options.setup {
        commands.extend(repo_setup_commands(&env.helm_repos));
        commands.push(use_context_command(&env.name));
    }

    let generated = helm.deploy_commands(&env, only)?;
    tracing::debug!(env = %env.name, count = generated.len(), diff = options.diff, "generated deploy commands");
    commands.extend(generated);

    println!("{}", style(format!("# environment: {}", env.name)).dim());
    for command in &commands {
        println!("{}", shell_join(command));
    }

    Ok(())
}

/// Join arguments into a line a POSIX shell splits back into the same words
fn shell_join(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| quote(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '=' | ',' | '@' | '+')
        });
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
