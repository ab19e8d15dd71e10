//! Static Analyser (§4.H).
//!
//! Grounded on the teacher's `CodeParser`/tag-extraction idiom in
//! `codeprysm-core::parser` (`Parser::new()` + `set_language`, manual
//! `node.walk()` + `children(&mut cursor)` traversal) but narrowed from the
//! teacher's query-driven, nine-language tag extractor to a single
//! hand-walked Python grammar, since this system only ever recognises one
//! language and needs call-site argument shape, not just tag locations.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tree_sitter::{Node, Parser};

use crate::error::{AnalyzerError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRef {
    pub module_path: String,
    pub names: Vec<String>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInstantiationRef {
    pub class_name: String,
    pub module_hint: Option<String>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCallRef {
    pub receiver_type_hint: Option<String>,
    pub method_name: String,
    pub positional_argc: usize,
    pub keyword_args: Vec<String>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCallRef {
    pub module_hint: Option<String>,
    pub function_name: String,
    pub positional_argc: usize,
    pub keyword_args: Vec<String>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeAccessRef {
    pub receiver_type_hint: Option<String>,
    pub attribute_name: String,
    pub line: usize,
    pub column: usize,
}

/// Every external reference the analyser found, in `(line, column)` order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub imports: Vec<ImportRef>,
    pub class_instantiations: Vec<ClassInstantiationRef>,
    pub method_calls: Vec<MethodCallRef>,
    pub function_calls: Vec<FunctionCallRef>,
    pub attribute_accesses: Vec<AttributeAccessRef>,
}

/// Local binding of a variable name to the class it was last constructed as,
/// within one function scope (§4.H: "`x = Class(...)` binds `x` to `Class`
/// within the enclosing function scope").
#[derive(Default, Clone)]
struct Scope {
    bindings: HashMap<String, String>,
}

impl Scope {
    fn bind(&mut self, name: &str, class_name: &str) {
        self.bindings.insert(name.to_string(), class_name.to_string());
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(String::as_str)
    }
}

pub struct StaticAnalyser {
    parser: Parser,
}

impl StaticAnalyser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::LANGUAGE.into();
        parser
            .set_language(&language)
            .map_err(|_| AnalyzerError::ParseFailed)?;
        Ok(Self { parser })
    }

    /// §4.H: parse `program_text` and enumerate its external references.
    pub fn analyse(&mut self, program_text: &str) -> Result<AnalysisResult> {
        let tree = self
            .parser
            .parse(program_text, None)
            .ok_or(AnalyzerError::ParseFailed)?;
        let source = program_text.as_bytes();

        let mut result = AnalysisResult::default();
        let mut scope = Scope::default();
        walk(tree.root_node(), source, &mut scope, &mut result);

        result.imports.sort_by_key(|r| (r.line, r.column));
        result
            .class_instantiations
            .sort_by_key(|r| (r.line, r.column));
        result.method_calls.sort_by_key(|r| (r.line, r.column));
        result.function_calls.sort_by_key(|r| (r.line, r.column));
        result
            .attribute_accesses
            .sort_by_key(|r| (r.line, r.column));
        Ok(result)
    }
}

impl Default for StaticAnalyser {
    fn default() -> Self {
        Self::new().expect("python grammar always loads")
    }
}

fn text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn position(node: &Node) -> (usize, usize) {
    let point = node.start_position();
    (point.row + 1, point.column + 1)
}

/// Annotated parameters (`def f(x: Class)`) also seed the scope, per §4.H.
fn bind_parameters(params: &Node, source: &[u8], scope: &mut Scope) {
    let mut cursor = params.walk();
    for child in params.children(&mut cursor) {
        if child.kind() == "typed_parameter" {
            let mut inner = child.walk();
            let mut name = None;
            let mut type_hint = None;
            for grandchild in child.children(&mut inner) {
                match grandchild.kind() {
                    "identifier" if name.is_none() => name = Some(text(&grandchild, source)),
                    "type" => type_hint = Some(text(&grandchild, source)),
                    _ => {}
                }
            }
            if let (Some(name), Some(type_hint)) = (name, type_hint) {
                scope.bind(name, type_hint);
            }
        }
    }
}

fn walk(node: Node, source: &[u8], scope: &mut Scope, result: &mut AnalysisResult) {
    match node.kind() {
        "import_statement" => collect_import(&node, source, result),
        "import_from_statement" => collect_import_from(&node, source, result),
        "assignment" => collect_assignment(&node, source, scope, result),
        "call" => collect_call(&node, source, scope, result),
        "attribute" => collect_attribute(&node, source, scope, result),
        "function_definition" => {
            // Bindings made inside a function body (assignments, nested
            // defs) must not escape to its siblings, so the body is walked
            // against a snapshot of the enclosing scope rather than the
            // scope itself.
            let mut inner_scope = scope.clone();
            if let Some(params) = node.child_by_field_name("parameters") {
                bind_parameters(&params, source, &mut inner_scope);
            }
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk(child, source, &mut inner_scope, result);
            }
            return;
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, source, scope, result);
    }
}

fn collect_import(node: &Node, source: &[u8], result: &mut AnalysisResult) {
    let (line, column) = position(node);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "dotted_name" | "identifier" => {
                result.imports.push(ImportRef {
                    module_path: text(&child, source).to_string(),
                    names: Vec::new(),
                    line,
                    column,
                });
            }
            "aliased_import" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    result.imports.push(ImportRef {
                        module_path: text(&name_node, source).to_string(),
                        names: Vec::new(),
                        line,
                        column,
                    });
                }
            }
            _ => {}
        }
    }
}

fn collect_import_from(node: &Node, source: &[u8], result: &mut AnalysisResult) {
    let (line, column) = position(node);
    let module_path = node
        .child_by_field_name("module_name")
        .map(|m| text(&m, source).to_string())
        .unwrap_or_default();

    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "dotted_name" if text(&child, source) != module_path => {
                names.push(text(&child, source).to_string());
            }
            "aliased_import" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    names.push(text(&name_node, source).to_string());
                }
            }
            _ => {}
        }
    }

    result.imports.push(ImportRef {
        module_path,
        names,
        line,
        column,
    });
}

/// Records `x = Class(...)` bindings in the enclosing scope (§4.H).
fn collect_assignment(node: &Node, source: &[u8], scope: &mut Scope, _result: &mut AnalysisResult) {
    let (Some(left), Some(right)) = (
        node.child_by_field_name("left"),
        node.child_by_field_name("right"),
    ) else {
        return;
    };
    if left.kind() != "identifier" || right.kind() != "call" {
        return;
    }
    let Some(function) = right.child_by_field_name("function") else {
        return;
    };
    if function.kind() == "identifier" {
        let class_name = text(&function, source);
        if class_name.chars().next().is_some_and(char::is_uppercase) {
            scope.bind(text(&left, source), class_name);
        }
    }
}

fn argument_shape(node: &Node, source: &[u8]) -> (usize, Vec<String>) {
    let mut positional_argc = 0;
    let mut keyword_args = Vec::new();
    let Some(arguments) = node.child_by_field_name("arguments") else {
        return (0, Vec::new());
    };
    let mut cursor = arguments.walk();
    for child in arguments.children(&mut cursor) {
        match child.kind() {
            "keyword_argument" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    keyword_args.push(text(&name_node, source).to_string());
                }
            }
            "(" | ")" | "," | "comment" => {}
            _ => positional_argc += 1,
        }
    }
    (positional_argc, keyword_args)
}

fn collect_call(node: &Node, source: &[u8], scope: &Scope, result: &mut AnalysisResult) {
    let Some(function) = node.child_by_field_name("function") else {
        return;
    };
    let (line, column) = position(node);
    let (positional_argc, keyword_args) = argument_shape(node, source);

    match function.kind() {
        "identifier" => {
            let name = text(&function, source);
            if name.chars().next().is_some_and(char::is_uppercase) {
                result.class_instantiations.push(ClassInstantiationRef {
                    class_name: name.to_string(),
                    module_hint: None,
                    line,
                    column,
                });
            } else {
                result.function_calls.push(FunctionCallRef {
                    module_hint: None,
                    function_name: name.to_string(),
                    positional_argc,
                    keyword_args,
                    line,
                    column,
                });
            }
        }
        "attribute" => {
            let Some(method_name_node) = function.child_by_field_name("attribute") else {
                return;
            };
            let method_name = text(&method_name_node, source).to_string();
            let Some(receiver) = function.child_by_field_name("object") else {
                return;
            };
            let receiver_type_hint = resolve_receiver(&receiver, source, scope);
            result.method_calls.push(MethodCallRef {
                receiver_type_hint,
                method_name,
                positional_argc,
                keyword_args,
                line,
                column,
            });
        }
        _ => {}
    }
}

/// Resolves a receiver expression to the class it was bound to, if known.
/// Unknown receivers (§4.H) are left as `None`, rendered `unknown` by callers.
fn resolve_receiver(receiver: &Node, source: &[u8], scope: &Scope) -> Option<String> {
    match receiver.kind() {
        "identifier" => {
            let name = text(receiver, source);
            if name == "self" {
                Some("self".to_string())
            } else {
                scope.lookup(name).map(str::to_string)
            }
        }
        "call" => {
            let function = receiver.child_by_field_name("function")?;
            if function.kind() == "identifier" {
                let name = text(&function, source);
                name.chars()
                    .next()
                    .is_some_and(char::is_uppercase)
                    .then(|| name.to_string())
            } else {
                None
            }
        }
        _ => None,
    }
}

fn collect_attribute(node: &Node, source: &[u8], scope: &Scope, result: &mut AnalysisResult) {
    // Attribute accesses that are the callee of a `call` are already
    // reported as method calls above; only record bare accesses.
    if let Some(parent) = node.parent() {
        if parent.kind() == "call" {
            if let Some(function) = parent.child_by_field_name("function") {
                if function.id() == node.id() {
                    return;
                }
            }
        }
    }

    let Some(attribute_name_node) = node.child_by_field_name("attribute") else {
        return;
    };
    let Some(receiver) = node.child_by_field_name("object") else {
        return;
    };
    let (line, column) = position(node);
    result.attribute_accesses.push(AttributeAccessRef {
        receiver_type_hint: resolve_receiver(&receiver, source, scope),
        attribute_name: text(&attribute_name_node, source).to_string(),
        line,
        column,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_plain_import() {
        let mut analyser = StaticAnalyser::new().unwrap();
        let result = analyser.analyse("import widgets.core\n").unwrap();
        assert_eq!(result.imports.len(), 1);
        assert_eq!(result.imports[0].module_path, "widgets.core");
    }

    #[test]
    fn collects_from_import_with_names() {
        let mut analyser = StaticAnalyser::new().unwrap();
        let result = analyser
            .analyse("from widgets.core import Widget, spin\n")
            .unwrap();
        assert_eq!(result.imports.len(), 1);
        assert_eq!(result.imports[0].module_path, "widgets.core");
        assert_eq!(result.imports[0].names, vec!["Widget", "spin"]);
    }

    #[test]
    fn resolves_bound_receiver_method_call() {
        let mut analyser = StaticAnalyser::new().unwrap();
        let source = "w = Widget()\nw.spin(5, speed=3)\n";
        let result = analyser.analyse(source).unwrap();
        assert_eq!(result.class_instantiations.len(), 1);
        assert_eq!(result.class_instantiations[0].class_name, "Widget");
        assert_eq!(result.method_calls.len(), 1);
        let call = &result.method_calls[0];
        assert_eq!(call.receiver_type_hint.as_deref(), Some("Widget"));
        assert_eq!(call.method_name, "spin");
        assert_eq!(call.positional_argc, 1);
        assert_eq!(call.keyword_args, vec!["speed"]);
    }

    #[test]
    fn unknown_receiver_yields_none_type_hint() {
        let mut analyser = StaticAnalyser::new().unwrap();
        let result = analyser.analyse("mystery.spin()\n").unwrap();
        assert_eq!(result.method_calls.len(), 1);
        assert_eq!(result.method_calls[0].receiver_type_hint, None);
    }

    #[test]
    fn parameter_annotation_binds_the_receiver_type() {
        let mut analyser = StaticAnalyser::new().unwrap();
        let source = "def run(w: Widget):\n    w.spin()\n";
        let result = analyser.analyse(source).unwrap();
        assert_eq!(result.method_calls.len(), 1);
        assert_eq!(result.method_calls[0].receiver_type_hint.as_deref(), Some("Widget"));
    }

    #[test]
    fn bindings_do_not_leak_across_sibling_function_scopes() {
        let mut analyser = StaticAnalyser::new().unwrap();
        let source = "def a():\n    x = Widget()\ndef b():\n    x.spin()\n";
        let result = analyser.analyse(source).unwrap();
        assert_eq!(result.method_calls.len(), 1);
        assert_eq!(result.method_calls[0].receiver_type_hint, None);
    }

    #[test]
    fn free_function_call_is_distinguished_from_instantiation() {
        let mut analyser = StaticAnalyser::new().unwrap();
        let result = analyser.analyse("noop()\n").unwrap();
        assert_eq!(result.function_calls.len(), 1);
        assert_eq!(result.function_calls[0].function_name, "noop");
        assert!(result.class_instantiations.is_empty());
    }

    #[test]
    fn references_are_ordered_by_line_then_column() {
        let mut analyser = StaticAnalyser::new().unwrap();
        let source = "import a\nimport b\nimport c\n";
        let result = analyser.analyse(source).unwrap();
        let lines: Vec<usize> = result.imports.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }
}
