//! The rewrite transformation.
//!
//! A selected file is parsed into a syntax tree (with byte-accurate spans),
//! scanned for generated `resolve_references` methods, and every resolution
//! target of the untransformed shape `ResolutionTarget::of::<T, L>()` whose
//! type `T` originates from an in-suffix compilation unit is spliced into
//! the dynamic form `ResolutionTarget::managed(group, version, kind,
//! list_kind)` over its exact byte span. Everything outside the spliced
//! spans is preserved byte-for-byte, and the dynamic form never matches the
//! untransformed shape again, so applying the rewrite to its own output is
//! a no-op.

use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;

use syn::spanned::Spanned;
use syn::visit::{self, Visit};
use tracing::{debug, trace};

use refpatch_loader::{CompilationUnit, FileArtifact, Workspace};

use crate::error::TransformError;
use crate::shapes::{RequestShape, ShapeTable, RESOLVER_METHOD};

/// What to do when a resolution target's provenance cannot be determined
/// (unknown alias, unit not loaded, or declaring unit carrying load
/// diagnostics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedTypePolicy {
    /// Leave the target untouched. Favors false negatives over rewrites
    /// based on incomplete information.
    #[default]
    Skip,
    /// Abort the run.
    Error,
}

/// Rewrite configuration, threaded explicitly so several configurations
/// can coexist in one process.
#[derive(Debug)]
pub struct RewriteConfig<'a> {
    /// A declaring unit is in-suffix iff its import path ends with this.
    pub group_suffix: &'a str,

    /// Import path -> API group overrides; otherwise the group is the
    /// final segment of the declaring unit's import path.
    pub group_overrides: &'a BTreeMap<String, String>,

    pub unresolved_types: UnresolvedTypePolicy,

    pub shapes: &'a ShapeTable,
}

/// Result of rewriting one file: the (possibly new) bytes and whether any
/// declaration was modified.
#[derive(Debug)]
pub struct RewriteOutcome {
    pub bytes: Vec<u8>,
    pub changed: bool,
}

/// Rewrite a selected file artifact owned by `unit`.
///
/// A file without candidate declarations comes back unchanged,
/// byte-for-byte. Parse failure is fatal: selected files are generator
/// output and must always be syntactically valid.
pub fn rewrite(
    workspace: &Workspace,
    unit: &CompilationUnit,
    file: &FileArtifact,
    config: &RewriteConfig<'_>,
) -> Result<RewriteOutcome, TransformError> {
    let source = std::str::from_utf8(&file.bytes).map_err(|_| TransformError::Utf8 {
        path: file.path.clone(),
    })?;
    let ast = syn::parse_file(source).map_err(|source_err| TransformError::Parse {
        path: file.path.clone(),
        source: source_err,
    })?;

    let mut edits: Vec<Edit> = Vec::new();
    for item in &ast.items {
        let syn::Item::Impl(item_impl) = item else {
            continue;
        };
        if item_impl.trait_.is_some() {
            continue;
        }
        let Some(receiver) = path_type_name(&item_impl.self_ty) else {
            continue;
        };
        // Generated resolver methods hang off a type declared by the unit
        // that owns the file; anything else has unknown provenance and is
        // left untouched.
        if workspace.resolve_type(unit, None, &receiver).is_none() {
            debug!(
                receiver = %receiver,
                file = %file.path.display(),
                "receiver provenance unknown, impl left untouched"
            );
            continue;
        }

        for impl_item in &item_impl.items {
            let syn::ImplItem::Fn(method) = impl_item else {
                continue;
            };
            if method.sig.ident != RESOLVER_METHOD {
                continue;
            }
            let mut visitor = TargetVisitor {
                workspace,
                unit,
                config,
                source,
                path: &file.path,
                edits: Vec::new(),
                error: None,
            };
            visitor.visit_block(&method.block);
            if let Some(err) = visitor.error {
                return Err(err);
            }
            edits.extend(visitor.edits);
        }
    }

    if edits.is_empty() {
        return Ok(RewriteOutcome {
            bytes: file.bytes.clone(),
            changed: false,
        });
    }

    // Splice back-to-front so earlier byte offsets stay valid.
    edits.sort_by_key(|e| e.range.start);
    let mut out = source.to_string();
    for edit in edits.iter().rev() {
        out.replace_range(edit.range.clone(), &edit.replacement);
    }

    Ok(RewriteOutcome {
        bytes: out.into_bytes(),
        changed: true,
    })
}

struct Edit {
    range: Range<usize>,
    replacement: String,
}

/// A matched untransformed target expression.
struct StaticTarget {
    /// Path qualifier of the managed type (`ec2` in `ec2::Vpc`), or none
    /// for a type declared by the rewritten unit itself.
    alias: Option<String>,
    kind: String,
    list_kind: String,
    /// Bytes of the call up to the constructor name; reused verbatim so a
    /// qualified `reference::ResolutionTarget::` spelling survives the
    /// rewrite.
    prefix_range: Range<usize>,
    /// Bytes of the whole call expression.
    call_range: Range<usize>,
}

impl StaticTarget {
    fn type_path(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{alias}::{}", self.kind),
            None => self.kind.clone(),
        }
    }
}

struct TargetVisitor<'a> {
    workspace: &'a Workspace,
    unit: &'a CompilationUnit,
    config: &'a RewriteConfig<'a>,
    source: &'a str,
    path: &'a Path,
    edits: Vec<Edit>,
    error: Option<TransformError>,
}

impl<'a, 'ast> Visit<'ast> for TargetVisitor<'a> {
    fn visit_expr_struct(&mut self, node: &'ast syn::ExprStruct) {
        if self.error.is_none() {
            let shape = node
                .path
                .segments
                .last()
                .and_then(|seg| self.config.shapes.shape_for(&seg.ident.to_string()));
            if let Some(shape) = shape {
                for field in &node.fields {
                    let syn::Member::Named(name) = &field.member else {
                        continue;
                    };
                    if *name == shape.target_field {
                        self.inspect_target(shape, &field.expr);
                    }
                }
            }
        }
        visit::visit_expr_struct(self, node);
    }
}

impl<'a> TargetVisitor<'a> {
    fn inspect_target(&mut self, shape: &RequestShape, expr: &syn::Expr) {
        // Already-transformed targets (or anything else that is not the
        // generator's static constructor) do not match; this check-and-set
        // is what makes the rewrite idempotent.
        let Some(target) = match_static_target(expr, shape) else {
            return;
        };

        let declaring =
            self.workspace
                .resolve_type(self.unit, target.alias.as_deref(), &target.kind);
        let Some(declaring) = declaring else {
            match self.config.unresolved_types {
                UnresolvedTypePolicy::Skip => {
                    debug!(
                        type_path = %target.type_path(),
                        file = %self.path.display(),
                        "target provenance unknown, left untouched"
                    );
                }
                UnresolvedTypePolicy::Error => {
                    self.error = Some(TransformError::UnresolvedType {
                        type_path: target.type_path(),
                        path: self.path.to_path_buf(),
                    });
                }
            }
            return;
        };

        if !declaring.import_path.ends_with(self.config.group_suffix) {
            trace!(
                type_path = %target.type_path(),
                declaring = %declaring.import_path,
                "target outside the group suffix, left untouched"
            );
            return;
        }

        let group = self
            .config
            .group_overrides
            .get(&declaring.import_path)
            .map(String::as_str)
            .unwrap_or_else(|| declaring.api_group());
        let prefix = &self.source[target.prefix_range.clone()];
        let replacement = format!(
            "{prefix}{}({:?}, {:?}, {:?}, {:?})",
            shape.dynamic_ctor, group, declaring.version, target.kind, target.list_kind
        );
        debug!(
            type_path = %target.type_path(),
            group = %group,
            version = %declaring.version,
            file = %self.path.display(),
            "rewriting resolution target"
        );
        self.edits.push(Edit {
            range: target.call_range,
            replacement,
        });
    }
}

/// Match `<..>ResolutionTarget::of::<T, L>()` against a shape row.
fn match_static_target(expr: &syn::Expr, shape: &RequestShape) -> Option<StaticTarget> {
    let syn::Expr::Call(call) = expr else {
        return None;
    };
    if !call.args.is_empty() {
        return None;
    }
    let syn::Expr::Path(func) = call.func.as_ref() else {
        return None;
    };
    let segments = &func.path.segments;
    if segments.len() < 2 {
        return None;
    }
    let ctor = &segments[segments.len() - 1];
    let target_type = &segments[segments.len() - 2];
    if ctor.ident != shape.static_ctor || target_type.ident != shape.target_type {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &ctor.arguments else {
        return None;
    };
    if args.args.len() != 2 {
        return None;
    }
    let (alias, kind) = type_arg_parts(&args.args[0])?;
    let (_, list_kind) = type_arg_parts(&args.args[1])?;

    let call_range = expr.span().byte_range();
    let ctor_start = ctor.ident.span().byte_range().start;
    Some(StaticTarget {
        alias,
        kind,
        list_kind,
        prefix_range: call_range.start..ctor_start,
        call_range,
    })
}

/// Split a generic type argument into (path qualifier, type name).
fn type_arg_parts(arg: &syn::GenericArgument) -> Option<(Option<String>, String)> {
    let syn::GenericArgument::Type(syn::Type::Path(type_path)) = arg else {
        return None;
    };
    if type_path.qself.is_some() {
        return None;
    }
    let segments = &type_path.path.segments;
    match segments.len() {
        0 => None,
        1 => Some((None, segments[0].ident.to_string())),
        n => Some((
            Some(segments[n - 2].ident.to_string()),
            segments[n - 1].ident.to_string(),
        )),
    }
}

fn path_type_name(ty: &syn::Type) -> Option<String> {
    let syn::Type::Path(type_path) = ty else {
        return None;
    };
    type_path
        .path
        .segments
        .last()
        .map(|seg| seg.ident.to_string())
}
