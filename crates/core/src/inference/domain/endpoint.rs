use std::path::PathBuf;

/// Identifies one loaded network and its named tensor access points.
///
/// Immutable once applied to a runner; reconfiguring with a different
/// `model_path` triggers a full reload, while an identical path is a no-op.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelEndpoint {
    pub model_path: PathBuf,
    pub input_node: String,
    pub output_nodes: Vec<String>,
}

impl ModelEndpoint {
    /// Endpoint for a network with a single output head.
    pub fn single(
        model_path: impl Into<PathBuf>,
        input_node: impl Into<String>,
        output_node: impl Into<String>,
    ) -> Self {
        Self {
            model_path: model_path.into(),
            input_node: input_node.into(),
            output_nodes: vec![output_node.into()],
        }
    }

    /// Endpoint for a network with two output heads sharing one forward
    /// pass.
    pub fn pair(
        model_path: impl Into<PathBuf>,
        input_node: impl Into<String>,
        output_a: impl Into<String>,
        output_b: impl Into<String>,
    ) -> Self {
        Self {
            model_path: model_path.into(),
            input_node: input_node.into(),
            output_nodes: vec![output_a.into(), output_b.into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_single_builds_one_output() {
        let ep = ModelEndpoint::single("age.onnx", "input", "age_out");
        assert_eq!(ep.model_path, Path::new("age.onnx"));
        assert_eq!(ep.input_node, "input");
        assert_eq!(ep.output_nodes, vec!["age_out".to_string()]);
    }

    #[test]
    fn test_pair_builds_two_outputs() {
        let ep = ModelEndpoint::pair("joint.onnx", "input", "age_out", "gender_out");
        assert_eq!(ep.output_nodes.len(), 2);
        assert_eq!(ep.output_nodes[1], "gender_out");
    }
}
