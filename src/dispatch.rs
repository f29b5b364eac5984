//! Mapping of commands to the operations they run.

use crate::cli_types::CommandName;
use crate::config::Config;
use crate::operations::{CleanNotebook, CodeFormat, Docformat, GrammarCheck, NewlineFix, Operation, SortImports};
use crate::tools::registry::{BLACK, FLAKE8, ISORT};
use crate::tools::{ToolDefinition, ToolExecutor, ToolRegistry};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    SortImports,
    CodeFormat,
    GrammarCheck,
    NewlineFix,
    CleanNotebook,
    Docformat,
}

/// Ordered operations for a command. `clean_notebooks` only affects `lint`.
pub fn plan(command: CommandName, clean_notebooks: bool) -> Vec<OperationKind> {
    match command {
        CommandName::SortLibraries => vec![OperationKind::SortImports],
        CommandName::CodeFormat => vec![OperationKind::CodeFormat],
        CommandName::GrammarCheck => vec![OperationKind::GrammarCheck],
        CommandName::NewlineFix => vec![OperationKind::NewlineFix],
        CommandName::CleanJupyter => vec![OperationKind::CleanNotebook],
        CommandName::Docformat => vec![OperationKind::Docformat],
        CommandName::Lint => {
            let mut kinds = Vec::with_capacity(5);
            if clean_notebooks {
                kinds.push(OperationKind::CleanNotebook);
            }
            kinds.extend([
                OperationKind::SortImports,
                OperationKind::CodeFormat,
                OperationKind::GrammarCheck,
                OperationKind::NewlineFix,
            ]);
            kinds
        }
    }
}

/// Everything operations need to be constructed.
pub struct OperationContext<'a> {
    pub config: &'a Config,
    pub registry: &'a ToolRegistry,
    pub executor: Arc<ToolExecutor>,
}

impl<'a> OperationContext<'a> {
    pub fn new(config: &'a Config, registry: &'a ToolRegistry) -> Self {
        Self {
            config,
            registry,
            executor: Arc::new(ToolExecutor::new(config.colint().timeout)),
        }
    }

    fn tool(&self, id: &str) -> ToolDefinition {
        if self.registry.is_overridden(id) {
            log::debug!("Using configured command for {id}");
        }
        self.registry.get(id).cloned().unwrap_or_default()
    }
}

pub fn build(kind: OperationKind, ctx: &OperationContext<'_>) -> Box<dyn Operation> {
    match kind {
        OperationKind::SortImports => Box::new(SortImports::new(ctx.tool(ISORT), Arc::clone(&ctx.executor))),
        OperationKind::CodeFormat => Box::new(CodeFormat::new(ctx.tool(BLACK), Arc::clone(&ctx.executor))),
        OperationKind::GrammarCheck => Box::new(GrammarCheck::new(
            ctx.tool(FLAKE8),
            Arc::clone(&ctx.executor),
            ctx.config.flake8().clone(),
        )),
        OperationKind::NewlineFix => Box::new(NewlineFix),
        OperationKind::CleanNotebook => Box::new(CleanNotebook::new(ctx.config.colint().strip_metadata_keys.clone())),
        OperationKind::Docformat => Box::new(Docformat::new(ctx.config.black().line_length)),
    }
}

/// Build the operations of a command, in execution order.
pub fn operations_for(
    command: CommandName,
    clean_notebooks: bool,
    ctx: &OperationContext<'_>,
) -> Vec<Box<dyn Operation>> {
    plan(command, clean_notebooks)
        .into_iter()
        .map(|kind| build(kind, ctx))
        .collect()
}
