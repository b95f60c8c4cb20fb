//! Executes script steps against one repository and renders the results.

use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context};
use cmr_repository::{Paging, Repository};
use cmr_store::{Content, ObjectData, ObjectInFolder};
use cmr_types::{property_ids as p, BaseKind, CallContext, Principal, Properties};
use colored::Colorize;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::script::Step;

pub struct Session {
    repo: Arc<Repository>,
    ctx: CallContext,
    format: OutputFormat,
}

impl Session {
    /// Start a session acting as `user`.
    pub fn new(repo: Arc<Repository>, user: &str, format: OutputFormat) -> Self {
        let ctx = CallContext::user(repo.id(), user);
        Self { repo, ctx, format }
    }

    /// The principal commands currently run as.
    pub fn user(&self) -> &str {
        self.ctx.username()
    }

    /// Run one step, writing its result to `out`.
    pub fn execute(&mut self, step: Step, out: &mut dyn Write) -> anyhow::Result<()> {
        match step {
            Step::User { name } => {
                self.ctx = self.ctx.with_principal(Principal::user(name));
                self.emit(out, json!({ "user": self.user() }), |out| {
                    writeln!(out, "acting as {}", self.user().bold())
                })
            }
            Step::Mkdir { path } => {
                let (parent, name) = split_path(&path)?;
                let parent = self.resolve(parent)?;
                let props = named(name, BaseKind::Folder.base_type_str());
                let id = self.repo.create_folder(&self.ctx, &props, &parent.id)?;
                self.emit(out, json!({ "id": id }), |out| {
                    writeln!(
                        out,
                        "{} folder {} {}",
                        "created".green(),
                        path.bold(),
                        id.short_id().dimmed()
                    )
                })
            }
            Step::Put {
                path,
                content,
                type_id,
                state,
                mime,
            } => {
                let (parent, name) = split_path(&path)?;
                let parent = self.resolve(parent)?;
                let props = named(name, &type_id);
                let content = content.map(|text| Content::new(text.into_bytes(), mime));
                let id = self
                    .repo
                    .create_document(&self.ctx, &props, Some(&parent.id), content, state)?;
                self.emit(out, json!({ "id": id }), |out| {
                    writeln!(
                        out,
                        "{} document {} {}",
                        "created".green(),
                        path.bold(),
                        id.short_id().dimmed()
                    )
                })
            }
            Step::Ls { path } => {
                let folder = self.resolve(&path)?;
                let page = self.repo.get_children(&self.ctx, &folder.id, Paging::all())?;
                self.emit(out, serde_json::to_value(&page)?, |out| {
                    for child in page.iter() {
                        writeln!(out, "{}", describe(child))?;
                    }
                    if page.has_more_items {
                        let more = format!("... {} more", page.num_items - page.len());
                        writeln!(out, "{}", more.dimmed())?;
                    }
                    Ok(())
                })
            }
            Step::Tree { path, depth } => {
                let folder = self.resolve(&path)?;
                let tree = self.repo.get_descendants(&self.ctx, &folder.id, depth)?;
                self.emit(out, serde_json::to_value(&tree)?, |out| {
                    writeln!(out, "{}", describe(&folder))?;
                    write_tree(out, &tree, 1)
                })
            }
            Step::Cat { path } => {
                let obj = self.resolve(&path)?;
                let content = self.repo.get_content_stream(&self.ctx, &obj.id, None, None)?;
                let text = String::from_utf8_lossy(&content.data).into_owned();
                self.emit(
                    out,
                    json!({ "mime_type": content.mime_type, "content": text }),
                    |out| writeln!(out, "{text}"),
                )
            }
            Step::Mv { path, target } => {
                let (source, _) = split_path(&path)?;
                let obj = self.resolve(&path)?;
                let source = self.resolve(source)?;
                let target = self.resolve(&target)?;
                self.repo
                    .move_object(&self.ctx, &obj.id, &target.id, &source.id)?;
                self.done(out, "moved", &path)
            }
            Step::Rename { path, name } => {
                let obj = self.resolve(&path)?;
                let props = Properties::new().with_string(p::NAME, name.as_str());
                let updated = self
                    .repo
                    .update_properties(&self.ctx, &obj.id, Some(obj.change_token), &props)?;
                self.emit(out, serde_json::to_value(&updated)?, |out| {
                    writeln!(
                        out,
                        "{} {} to {}",
                        "renamed".green(),
                        path.bold(),
                        updated.name.bold()
                    )
                })
            }
            Step::Link { path, folder } => {
                let obj = self.resolve(&path)?;
                let folder = self.resolve(&folder)?;
                self.repo
                    .add_object_to_folder(&self.ctx, &obj.id, &folder.id, true)?;
                self.done(out, "linked", &path)
            }
            Step::Unlink { path, folder } => {
                let obj = self.resolve(&path)?;
                let folder = self.resolve(&folder)?;
                self.repo
                    .remove_object_from_folder(&self.ctx, &obj.id, &folder.id)?;
                self.done(out, "unlinked", &path)
            }
            Step::Rm { path, all_versions } => {
                let obj = self.resolve(&path)?;
                self.repo.delete_object(&self.ctx, &obj.id, all_versions)?;
                self.done(out, "deleted", &path)
            }
            Step::Rmtree {
                path,
                continue_on_failure,
            } => {
                let folder = self.resolve(&path)?;
                let failed = self
                    .repo
                    .delete_tree(&self.ctx, &folder.id, continue_on_failure)?;
                self.emit(out, json!({ "failed": failed }), |out| {
                    if failed.is_empty() {
                        writeln!(out, "{} {}", "deleted tree".green(), path.bold())
                    } else {
                        writeln!(
                            out,
                            "{} {} ({} failed)",
                            "deleted tree".yellow(),
                            path.bold(),
                            failed.len()
                        )?;
                        for id in &failed {
                            writeln!(out, "  {} {}", "kept".red(), id)?;
                        }
                        Ok(())
                    }
                })
            }
            Step::Checkout { path } => {
                let obj = self.resolve(&path)?;
                let pwc = self.repo.check_out(&self.ctx, &obj.id)?;
                self.emit(out, json!({ "pwc": pwc }), |out| {
                    writeln!(
                        out,
                        "{} {} (pwc {})",
                        "checked out".green(),
                        path.bold(),
                        pwc.short_id().dimmed()
                    )
                })
            }
            Step::Cancel { path } => {
                let obj = self.resolve(&path)?;
                self.repo.cancel_check_out(&self.ctx, &obj.id)?;
                self.done(out, "cancelled check-out of", &path)
            }
            Step::Checkin {
                path,
                major,
                content,
                message,
            } => {
                let obj = self.resolve(&path)?;
                let content = content.map(|text| Content::new(text.into_bytes(), "text/plain"));
                let version = self.repo.check_in(
                    &self.ctx,
                    &obj.id,
                    major,
                    &Properties::new(),
                    content,
                    message.as_deref(),
                )?;
                let data = self.repo.get_object(&self.ctx, &version, false)?;
                let label = version_label(&data);
                self.emit(out, json!({ "id": version, "label": label }), |out| {
                    writeln!(out, "{} {} as {}", "checked in".green(), path.bold(), label.yellow())
                })
            }
            Step::Versions { path } => {
                let obj = self.resolve(&path)?;
                let versions = self.repo.get_all_versions(&self.ctx, &obj.id)?;
                self.emit(out, serde_json::to_value(&versions)?, |out| {
                    for v in &versions {
                        writeln!(out, "{}", describe_version(v))?;
                    }
                    Ok(())
                })
            }
            Step::Actions { path } => {
                let obj = self.resolve(&path)?;
                let actions = self.repo.get_allowable_actions(&self.ctx, &obj.id)?;
                self.emit(out, serde_json::to_value(&actions)?, |out| {
                    for action in actions.iter() {
                        writeln!(out, "{action}")?;
                    }
                    Ok(())
                })
            }
            Step::Props { path } => {
                let obj = self.resolve(&path)?;
                let props = self.repo.get_properties(&self.ctx, &obj.id)?;
                self.emit(out, serde_json::to_value(&props)?, |out| {
                    for data in props.iter() {
                        let values: Vec<String> =
                            data.values.iter().map(|v| v.to_string()).collect();
                        writeln!(out, "{} = {}", data.id.cyan(), values.join(", "))?;
                    }
                    Ok(())
                })
            }
        }
    }

    fn resolve(&self, path: &str) -> anyhow::Result<ObjectData> {
        self.repo
            .get_object_by_path(&self.ctx, path, false)
            .with_context(|| format!("cannot resolve {path}"))
    }

    fn emit(
        &self,
        out: &mut dyn Write,
        value: serde_json::Value,
        text: impl FnOnce(&mut dyn Write) -> std::io::Result<()>,
    ) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?,
            OutputFormat::Text => text(out)?,
        }
        Ok(())
    }

    fn done(&self, out: &mut dyn Write, verb: &str, path: &str) -> anyhow::Result<()> {
        self.emit(out, json!({ "ok": true }), |out| {
            writeln!(out, "{} {}", verb.green(), path.bold())
        })
    }
}

fn named(name: &str, type_id: &str) -> Properties {
    Properties::new()
        .with_string(p::NAME, name)
        .with_id(p::OBJECT_TYPE_ID, type_id)
}

/// Split an absolute path into its parent path and last segment.
fn split_path(path: &str) -> anyhow::Result<(&str, &str)> {
    let trimmed = path.trim_end_matches('/');
    let Some((parent, name)) = trimmed.rsplit_once('/') else {
        bail!("path {path:?} is not absolute");
    };
    if name.is_empty() {
        bail!("path {path:?} has no name");
    }
    Ok((if parent.is_empty() { "/" } else { parent }, name))
}

fn version_label(data: &ObjectData) -> String {
    data.version
        .as_ref()
        .map(|v| v.label.clone())
        .unwrap_or_default()
}

fn describe(data: &ObjectData) -> String {
    match data.base_kind {
        BaseKind::Folder => format!("{}/", data.name).blue().bold().to_string(),
        _ => {
            let mut line = data.name.clone();
            if let Some(content) = &data.content {
                line.push_str(&format!(" {}", format!("({} bytes)", content.length).dimmed()));
            }
            if let Some(version) = &data.version {
                line.push_str(&format!(" {}", version.label.yellow()));
                if let Some(owner) = &version.checked_out_by {
                    line.push_str(&format!(" {}", format!("[checked out by {owner}]").red()));
                }
            }
            line
        }
    }
}

fn describe_version(data: &ObjectData) -> String {
    let Some(version) = &data.version else {
        return data.id.to_string();
    };
    let mut line = format!("{} {}", version.label.yellow(), data.id.short_id().dimmed());
    if version.is_pwc {
        line.push_str(&format!(" {}", "pwc".red()));
    }
    if version.is_latest_major {
        line.push_str(&format!(" {}", "latest-major".green()));
    }
    if let Some(comment) = &version.checkin_comment {
        line.push_str(&format!(" {comment:?}"));
    }
    line
}

fn write_tree(out: &mut dyn Write, nodes: &[ObjectInFolder], level: usize) -> std::io::Result<()> {
    for node in nodes {
        writeln!(out, "{}{}", "  ".repeat(level), describe(&node.object))?;
        write_tree(out, &node.children, level + 1)?;
    }
    Ok(())
}
