use srcscope::srcml::reader::unit_for_snippet;
use srcscope::{CallGraph, Language, LanguageDescriptor, ResolvableUse, ScopeCategory, ScopeGraph, TypeKind};

fn compile(snippet: &str, file: &str) -> ScopeGraph {
    compile_as(snippet, file, Language::CPlusPlus)
}

fn compile_as(snippet: &str, file: &str, language: Language) -> ScopeGraph {
    let unit = unit_for_snippet(snippet, file, language).unwrap();
    srcscope::compile(&unit, &LanguageDescriptor::builtin(language)).unwrap()
}

const A_H: &str = r#"<class>class <name>A</name> <block>{<private type="default">
</private><public>public:
    <decl_stmt><decl><type><name>B</name></type> <name>b</name></decl>;</decl_stmt>
    <function><type><name>bool</name></type> <name>Contains</name><parameter_list>()</parameter_list> <block>{ <return>return <expr><name>b</name><op:operator>.</op:operator><call><name>Contains</name><argument_list>()</argument_list></call></expr>;</return> }</block></function>
</public>}</block>;</class>"#;

const B_H: &str = r#"<class>class <name>B</name> <block>{<private type="default">
</private><public>public:
    <function><type><name>bool</name></type> <name>Contains</name><parameter_list>()</parameter_list> <block>{ <return>return <expr><lit:literal type="boolean">true</lit:literal></expr>;</return> }</block></function>
</public>}</block>;</class>"#;

#[test]
fn test_every_graph_has_one_global_root() {
    for (snippet, file) in [(A_H, "A.h"), (B_H, "B.h"), ("", "empty.cpp")] {
        let graph = compile(snippet, file);
        let root = graph.root();
        assert!(graph[root].is_global());
        assert_eq!(graph.parent(root), None);
        let globals = graph
            .scopes()
            .filter(|(_, scope)| scope.is_global())
            .count();
        assert_eq!(globals, 1);
    }
}

#[test]
fn test_merge_is_symmetric() {
    let forward = srcscope::merge(compile(A_H, "A.h"), compile(B_H, "B.h"));
    let backward = srcscope::merge(compile(B_H, "B.h"), compile(A_H, "A.h"));
    assert_eq!(forward.snapshot(), backward.snapshot());
}

#[test]
fn test_merge_with_itself_duplicates_nothing() {
    let graph = compile(A_H, "A.h");
    let before = graph.snapshot();
    let merged = srcscope::merge(graph.clone(), graph);
    let after = merged.snapshot();

    assert_eq!(before.scope_count(), after.scope_count());
    let class = merged.find_by_full_name("A")[0];
    assert_eq!(merged[class].declarations().count(), 1);
    let method = merged.find_by_full_name("A.Contains")[0];
    assert_eq!(merged[method].method_calls.len(), 1);
    assert_eq!(before, after);
}

#[test]
fn test_call_resolves_through_field_type() {
    let program = srcscope::merge(compile(A_H, "A.h"), compile(B_H, "B.h"));
    let a_contains = program.find_by_full_name("A.Contains")[0];
    let b_contains = program.find_by_full_name("B.Contains")[0];

    let call = &program[a_contains].method_calls[0];
    assert_eq!(call.find_matches(&program), vec![b_contains]);
    assert!(program.contains_call_to(a_contains, b_contains));
    assert!(!program.contains_call_to(a_contains, a_contains));

    let call_graph = CallGraph::build(&program);
    assert_eq!(call_graph.callers(b_contains), vec![a_contains]);
}

#[test]
fn test_call_left_unresolved_without_callee_file() {
    let graph = compile(A_H, "A.h");
    let method = graph.find_by_full_name("A.Contains")[0];
    assert!(graph[method].method_calls[0].find_matches(&graph).is_empty());
}

const FOO_DECL_INT: &str = r#"<function_decl><type><name>void</name></type> <name>Foo</name><parameter_list>(<param><decl><type><name>int</name></type></decl></param>)</parameter_list>;</function_decl>"#;
const FOO_DEF_INT: &str = r#"<function><type><name>void</name></type> <name>Foo</name><parameter_list>(<param><decl><type><name>int</name></type> <name>a</name></decl></param>)</parameter_list> <block>{ }</block></function>"#;
const FOO_DEF_STRING: &str = r#"<function><type><name>void</name></type> <name>Foo</name><parameter_list>(<param><decl><type><name>string</name></type> <name>a</name></decl></param>)</parameter_list> <block>{ }</block></function>"#;

#[test]
fn test_matching_parameters_merge_locations() {
    let program = srcscope::merge(compile(FOO_DECL_INT, "Foo.h"), compile(FOO_DEF_INT, "Foo.cpp"));
    let methods = program.children_named(program.root(), "Foo");
    assert_eq!(methods.len(), 1);

    let method = &program[methods[0]];
    let parameters = &method.as_method().unwrap().parameters;
    assert_eq!(parameters.len(), 1);
    assert_eq!(parameters[0].name, "a");
    assert_eq!(parameters[0].locations.len(), 2);
    assert_eq!(method.locations.len(), 2);
    assert!(program.conflicts().is_empty());
}

#[test]
fn test_mismatched_parameters_unify_as_conflict() {
    let mut program = srcscope::merge(compile(FOO_DECL_INT, "Foo.h"), compile(FOO_DEF_STRING, "Foo.cpp"));
    let methods = program.children_named(program.root(), "Foo");
    assert_eq!(methods.len(), 2);

    let survivor = program.unify(methods[0], methods[1]).unwrap();
    assert_eq!(program.children_named(program.root(), "Foo"), vec![survivor]);
    let parameters = &program[survivor].as_method().unwrap().parameters;
    assert_eq!(parameters.len(), 1);
    assert_eq!(parameters[0].parameter_type.name, "int");
    assert_eq!(program.conflicts().len(), 1);
    assert_eq!(program.conflicts()[0].kept_type, "int");
    assert_eq!(program.conflicts()[0].discarded_type, "string");
}

#[test]
fn test_qualified_parent_type() {
    let graph = compile(
        r#"<class>class <name>D</name> <super>: <name><name>A</name><op:operator>::</op:operator><name>B</name><op:operator>::</op:operator><name>C</name></name></super> <block>{<private type="default">
</private>}</block>;</class>"#,
        "D.h",
    );
    let d = graph.find_by_full_name("D")[0];
    let parents = &graph[d].as_type().unwrap().parent_types;
    assert_eq!(parents.len(), 1);
    assert_eq!(parents[0].name, "C");
    assert_eq!(parents[0].prefix_names(), vec!["A", "B"]);
}

#[test]
fn test_remove_file() {
    let leaf = r#"<namespace>namespace <name>N</name> <block>{
    <class>class <name>Leaf</name> <block>{<private type="default"></private>}</block>;</class>
    <class>class <name>Shared</name> <block>{<private type="default"></private>}</block>;</class>
}</block></namespace>"#;
    let other = r#"<namespace>namespace <name>N</name> <block>{
    <class_decl>class <name>Shared</name>;</class_decl>
}</block></namespace>"#;
    let program = srcscope::merge(compile(leaf, "A.h"), compile(other, "B.h"));
    assert_eq!(program.find_by_full_name("N.Leaf").len(), 1);

    let program = srcscope::remove_file(program, "A.h");
    let namespace = program.find_namespaces(&["N"])[0];
    assert!(program.children_named(namespace, "Leaf").is_empty());

    let shared = program.children_named(namespace, "Shared");
    assert_eq!(shared.len(), 1);
    let locations = &program[shared[0]].locations;
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].file, "B.h");

    let unchanged = srcscope::remove_file(program.clone(), "missing.h");
    assert_eq!(unchanged.snapshot(), program.snapshot());
}

#[test]
fn test_multi_declaration_shares_type() {
    let graph = compile(
        r#"<decl_stmt><decl><type><name>int</name></type> <name>a</name>,<name>b</name>,<name>c</name></decl>;</decl_stmt>"#,
        "vars.cpp",
    );
    let declarations: Vec<_> = graph[graph.root()].declarations().collect();
    assert_eq!(declarations.len(), 3);

    let names: Vec<&str> = declarations.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    let types: Vec<&str> = declarations
        .iter()
        .map(|d| d.variable_type.as_ref().unwrap().name.as_str())
        .collect();
    assert_eq!(types, vec!["int", "int", "int"]);
    assert_ne!(declarations[0].locations[0], declarations[1].locations[0]);
    assert_ne!(declarations[1].locations[0], declarations[2].locations[0]);
}

#[test]
fn test_type_nested_in_function_skips_namespaces() {
    let graph = compile(
        r#"<namespace>namespace <name>N</name> <block>{
<function><type><name>int</name></type> <name>main</name><parameter_list>()</parameter_list> <block>{
    <class>class <name>Local</name> <block>{<private type="default"></private>}</block>;</class>
}</block></function>
}</block></namespace>"#,
        "main.cpp",
    );
    let local = graph.descendants_of(graph.root(), ScopeCategory::Type)[0];
    assert_eq!(graph.full_name(local), "N.main.Local");
    let namespace = graph.nearest_ancestor(local, ScopeCategory::Namespace).unwrap();
    assert_eq!(graph.full_name(namespace), "N");
}

const PARTIAL_A: &str = r#"<class><specifier>partial</specifier> class <name>A</name> <super>: <name>B</name></super> <block>{ }</block></class>"#;

#[test]
fn test_parent_type_survives_while_another_file_writes_it() {
    let program = srcscope::merge(
        compile_as(PARTIAL_A, "A1.cs", Language::CSharp),
        compile_as(PARTIAL_A, "A2.cs", Language::CSharp),
    );
    let a = program.find_by_full_name("A")[0];
    let definition = program[a].as_type().unwrap();
    assert_eq!(definition.parent_types.len(), 1);
    assert_eq!(definition.parent_type_locations(0).len(), 2);

    let program = srcscope::remove_file(program, "A1.cs");
    let a = program.find_by_full_name("A")[0];
    let files: Vec<&str> = program[a].locations.iter().map(|l| l.file.as_str()).collect();
    assert_eq!(files, vec!["A2.cs"]);
    let definition = program[a].as_type().unwrap();
    let parents: Vec<&str> = definition.parent_types.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(parents, vec!["B"]);
    assert_eq!(definition.parent_types[0].location.as_ref().unwrap().file, "A2.cs");

    let program = srcscope::remove_file(program, "A2.cs");
    assert!(program.find_by_full_name("A").is_empty());
}

const STRUCT_S: &str = r#"<struct>struct <name>S</name> <block>{<public type="default"></public>}</block>;</struct>"#;
const FORWARD_S: &str = r#"<class_decl>class <name>S</name>;</class_decl>"#;

#[test]
fn test_forward_declaration_merge_is_symmetric() {
    let forward = srcscope::merge(compile(STRUCT_S, "S.h"), compile(FORWARD_S, "U.h"));
    let backward = srcscope::merge(compile(FORWARD_S, "U.h"), compile(STRUCT_S, "S.h"));
    assert_eq!(forward.snapshot(), backward.snapshot());

    for program in [&forward, &backward] {
        let s = program.find_by_full_name("S");
        assert_eq!(s.len(), 1);
        assert_eq!(program[s[0]].as_type().unwrap().kind, TypeKind::Struct);
        assert_eq!(program[s[0]].locations.len(), 2);
    }
}

const BAR_DECL: &str = r#"<function_decl><type><name>int</name></type> <name>Bar</name><parameter_list>()</parameter_list>;</function_decl>"#;
const BAR_DEF: &str = r#"<function><type><name>long</name></type> <name>Bar</name><parameter_list>()</parameter_list> <block>{ }</block></function>"#;

#[test]
fn test_definition_return_type_wins_either_order() {
    let forward = srcscope::merge(compile(BAR_DEF, "Bar.cpp"), compile(BAR_DECL, "Bar.h"));
    let backward = srcscope::merge(compile(BAR_DECL, "Bar.h"), compile(BAR_DEF, "Bar.cpp"));
    assert_eq!(forward.snapshot(), backward.snapshot());

    let bar = backward.find_by_full_name("Bar")[0];
    let return_type = backward[bar].as_method().unwrap().return_type.as_ref().unwrap();
    assert_eq!(return_type.name, "long");
}
