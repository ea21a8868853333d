//! Table of recognized generated request shapes.
//!
//! The generator's output evolves; rather than hard-coding the matcher,
//! each recognized shape is one table row naming the request struct, the
//! field carrying the resolution target and the constructor pair involved
//! in the rewrite. Supporting a new generator shape means adding a row,
//! not touching the matcher.

/// Name of the generated resolver method the rewriter scans for.
pub const RESOLVER_METHOD: &str = "resolve_references";

/// One recognized request shape and the rewrite rule attached to it.
#[derive(Debug, Clone)]
pub struct RequestShape {
    /// Final path segment of the request struct literal
    /// (e.g. `ResolutionRequest`).
    pub request_struct: String,

    /// Field of the request struct holding the resolution target.
    pub target_field: String,

    /// Type the target constructors hang off (e.g. `ResolutionTarget`).
    pub target_type: String,

    /// The statically-typed constructor the generator emits
    /// (`of` in `ResolutionTarget::of::<T, L>()`).
    pub static_ctor: String,

    /// The dynamic constructor substituted by the rewrite
    /// (`managed` in `ResolutionTarget::managed(group, version, kind, list_kind)`).
    pub dynamic_ctor: String,
}

impl RequestShape {
    fn target(request_struct: &str) -> Self {
        Self {
            request_struct: request_struct.to_string(),
            target_field: "to".to_string(),
            target_type: "ResolutionTarget".to_string(),
            static_ctor: "of".to_string(),
            dynamic_ctor: "managed".to_string(),
        }
    }
}

/// The set of shapes a run recognizes. Defaults to the two request kinds
/// the current generator emits (single and multi resolution).
#[derive(Debug, Clone)]
pub struct ShapeTable {
    shapes: Vec<RequestShape>,
}

impl Default for ShapeTable {
    fn default() -> Self {
        Self {
            shapes: vec![
                RequestShape::target("ResolutionRequest"),
                RequestShape::target("MultiResolutionRequest"),
            ],
        }
    }
}

impl ShapeTable {
    pub fn new(shapes: Vec<RequestShape>) -> Self {
        Self { shapes }
    }

    /// Register an additional recognized shape.
    pub fn push(&mut self, shape: RequestShape) {
        self.shapes.push(shape);
    }

    /// Look up the shape for a request struct name, if recognized.
    pub fn shape_for(&self, request_struct: &str) -> Option<&RequestShape> {
        self.shapes
            .iter()
            .find(|s| s.request_struct == request_struct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_knows_both_request_kinds() {
        let table = ShapeTable::default();
        assert!(table.shape_for("ResolutionRequest").is_some());
        assert!(table.shape_for("MultiResolutionRequest").is_some());
        assert!(table.shape_for("SomethingElse").is_none());
    }

    #[test]
    fn test_shapes_are_additive() {
        let mut table = ShapeTable::default();
        table.push(RequestShape {
            request_struct: "BatchResolutionRequest".to_string(),
            target_field: "targets".to_string(),
            target_type: "ResolutionTarget".to_string(),
            static_ctor: "of".to_string(),
            dynamic_ctor: "managed".to_string(),
        });

        let shape = table.shape_for("BatchResolutionRequest").unwrap();
        assert_eq!(shape.target_field, "targets");
    }
}
