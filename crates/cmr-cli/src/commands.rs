use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use cmr_repository::{Repository, RepositoryConfig, RepositoryManager};
use cmr_types::{CallContext, ObjectTypeId};
use cmr_typesys::TypeTreeNode;
use colored::Colorize;

use crate::cli::*;
use crate::script::parse_line;
use crate::session::Session;

/// Dispatch a parsed command line.
pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let repo = open_repository(cli.config.as_deref())?;
    match cli.command {
        Command::Types(args) => cmd_types(&repo, args, cli.format),
        Command::Run(args) => cmd_run(repo, args, cli.format),
        Command::Shell(args) => cmd_shell(repo, args, cli.format),
    }
}

fn open_repository(path: Option<&Path>) -> anyhow::Result<Arc<Repository>> {
    let config = match path {
        Some(path) => RepositoryConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => RepositoryConfig::default(),
    };
    let id = config.id.clone();
    let manager = RepositoryManager::from_configs([config])?;
    Ok(manager.get(&id)?)
}

fn cmd_types(repo: &Repository, args: TypesArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CallContext::user(repo.id(), "admin");
    let root = args.root.map(ObjectTypeId::new);
    let mut tree = repo.get_type_descendants(&ctx, root.as_ref(), None, args.properties)?;
    if let Some(root) = &root {
        let mut definition = repo.get_type_definition(&ctx, root)?;
        if !args.properties {
            definition = definition.without_property_definitions();
        }
        tree = vec![TypeTreeNode {
            definition,
            children: tree,
        }];
    }

    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&tree)?)?,
        OutputFormat::Text => write_types(&mut out, &tree, 0)?,
    }
    Ok(())
}

fn write_types(out: &mut dyn Write, nodes: &[TypeTreeNode], level: usize) -> io::Result<()> {
    let indent = "  ".repeat(level);
    for node in nodes {
        let def = &node.definition;
        let mut line = format!("{indent}{}", def.id.as_str().bold());
        if def.display_name != def.id.as_str() {
            line.push_str(&format!(" ({})", def.display_name));
        }
        if def.flags.versionable {
            line.push_str(&format!(" {}", "versionable".yellow()));
        }
        writeln!(out, "{line}")?;
        for prop in def.own_property_definitions() {
            let required = if prop.required { " required" } else { "" };
            writeln!(
                out,
                "{indent}  - {} {}{}{}",
                prop.id.cyan(),
                prop.property_type,
                if prop.is_multi() { "[]" } else { "" },
                required
            )?;
        }
        write_types(out, &node.children, level + 1)?;
    }
    Ok(())
}

fn cmd_run(repo: Arc<Repository>, args: RunArgs, format: OutputFormat) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(&args.script)
        .with_context(|| format!("reading script {}", args.script.display()))?;
    let mut session = Session::new(repo, &args.user, format);
    let mut out = io::stdout().lock();
    let failures = run_script(&mut session, &source, args.keep_going, &mut out)?;
    if failures > 0 {
        bail!("{failures} command(s) failed");
    }
    Ok(())
}

/// Execute every line of `source`. Without `keep_going` the first failure
/// aborts; otherwise failures are reported and counted.
fn run_script(
    session: &mut Session,
    source: &str,
    keep_going: bool,
    out: &mut dyn Write,
) -> anyhow::Result<usize> {
    let mut failures = 0;
    for (index, line) in source.lines().enumerate() {
        let result = parse_line(line).and_then(|step| match step {
            Some(step) => session.execute(step, out),
            None => Ok(()),
        });
        if let Err(e) = result {
            let e = e.context(format!("line {}: {}", index + 1, line.trim()));
            if !keep_going {
                return Err(e);
            }
            eprintln!("{} {e:#}", "error:".red().bold());
            failures += 1;
        }
    }
    Ok(failures)
}

fn cmd_shell(repo: Arc<Repository>, args: ShellArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut session = Session::new(repo, &args.user, format);
    let mut out = io::stdout().lock();
    for line in io::stdin().lock().lines() {
        let line = line?;
        let result = parse_line(&line).and_then(|step| match step {
            Some(step) => session.execute(step, &mut out),
            None => Ok(()),
        });
        if let Err(e) = result {
            eprintln!("{} {e:#}", "error:".red().bold());
        }
        out.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> Arc<Repository> {
        let config = RepositoryConfig::from_toml_str(
            r#"
            [[types]]
            id = "test:versioned"
            parent = "cmis:document"
            display_name = "Versioned"
            versionable = true

            [[types.properties]]
            id = "test:tags"
            type = "string"
            cardinality = "multi"
            "#,
        )
        .unwrap();
        Arc::new(Repository::new(config).unwrap())
    }

    #[test]
    fn type_tree_rendering() {
        colored::control::set_override(false);
        let repo = repo();
        let ctx = CallContext::user("A1", "admin");
        let tree = repo.get_type_descendants(&ctx, None, None, true).unwrap();
        let mut out = Vec::new();
        write_types(&mut out, &tree, 0).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("cmis:folder"));
        assert!(text.contains("  test:versioned (Versioned) versionable"));
        assert!(text.contains("    - test:tags string[]"));
    }

    #[test]
    fn script_runs_to_completion() {
        colored::control::set_override(false);
        let mut session = Session::new(repo(), "alice", OutputFormat::Text);
        let script = "\
# scenario
mkdir /A
put /A/doc.txt hello -t test:versioned
checkout /A/doc.txt
checkin /A/doc.txt -m edit
versions /A/doc.txt
";
        let mut out = Vec::new();
        let failures = run_script(&mut session, script, false, &mut out).unwrap();
        assert_eq!(failures, 0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("V 1.1"));
    }

    #[test]
    fn script_stops_at_first_failure() {
        let mut session = Session::new(repo(), "alice", OutputFormat::Text);
        let mut out = Vec::new();
        let err = run_script(&mut session, "mkdir /A\nmkdir /A\nmkdir /B\n", false, &mut out)
            .unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn script_keeps_going() {
        let mut session = Session::new(repo(), "alice", OutputFormat::Text);
        let mut out = Vec::new();
        let failures =
            run_script(&mut session, "mkdir /A\nbogus\nmkdir /A\nmkdir /B\n", true, &mut out)
                .unwrap();
        assert_eq!(failures, 2);
        assert!(String::from_utf8(out).unwrap().contains("/B"));
    }

    #[test]
    fn default_repository() {
        let repo = open_repository(None).unwrap();
        assert_eq!(repo.id(), "A1");
    }
}
