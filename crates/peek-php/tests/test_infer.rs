mod common;

use common::{describe_snippet, resolve_snippet};
use peek_core::{Resolution, TypeKind};
use pretty_assertions::assert_eq;

fn kind_and_name(value: &str) -> (TypeKind, String) {
    let desc = describe_snippet(&format!("$smarty->assign('v', {value});\n"), "v");
    (desc.kind, desc.type_name)
}

#[track_caller]
fn assert_classified(value: &str, kind: TypeKind, name: &str) {
    let actual = kind_and_name(value);
    assert_eq!(actual, (kind, name.to_string()), "{value}");
}

#[test]
fn literals() {
    let cases = [
        ("'single'", TypeKind::LiteralPrimitive, "string"),
        ("\"double\"", TypeKind::LiteralPrimitive, "string"),
        ("\"hi {$name}\"", TypeKind::LiteralPrimitive, "string"),
        ("42", TypeKind::LiteralPrimitive, "int"),
        ("0x1F", TypeKind::LiteralPrimitive, "int"),
        ("4.2", TypeKind::LiteralPrimitive, "float"),
        ("-1", TypeKind::LiteralPrimitive, "int"),
        ("-4.2", TypeKind::LiteralPrimitive, "float"),
        ("true", TypeKind::LiteralPrimitive, "bool"),
        ("false", TypeKind::LiteralPrimitive, "bool"),
        ("null", TypeKind::LiteralPrimitive, "null"),
    ];
    for (value, kind, name) in cases {
        assert_classified(value, kind, name);
    }
}

#[test]
fn heredoc_and_nowdoc_are_strings() {
    let desc = describe_snippet("$smarty->assign('v', <<<EOT\nhello $name\nEOT\n);\n", "v");
    assert_eq!(desc.type_name, "string");
    let desc = describe_snippet("$smarty->assign('v', <<<'EOT'\nhello\nEOT\n);\n", "v");
    assert_eq!(desc.type_name, "string");
}

#[test]
fn arrays_are_collections() {
    let desc = describe_snippet("$smarty->assign('v', [1, 2, 3]);\n", "v");
    assert_eq!(desc.kind, TypeKind::Array);
    assert!(desc.is_collection);
    assert_eq!(desc.structure, None);

    let desc = describe_snippet("$smarty->assign('v', array());\n", "v");
    assert_eq!(desc.type_name, "array");
}

#[test]
fn object_creation_is_an_entity() {
    let desc = describe_snippet("$smarty->assign('v', new \\App\\Model\\User($id));\n", "v");
    assert_eq!(desc.kind, TypeKind::Entity);
    assert!(desc.is_entity);
    assert_eq!(desc.type_name, "App\\Model\\User");

    assert_classified("new Product", TypeKind::Entity, "Product");
    assert_classified("new $class()", TypeKind::Entity, "object");
    assert_classified("new class {}", TypeKind::Entity, "object");
}

#[test]
fn names_are_reported_as_written() {
    assert_classified("PHP_EOL", TypeKind::LiteralPrimitive, "PHP_EOL");
    assert_classified("\\App\\LIMIT", TypeKind::LiteralPrimitive, "\\App\\LIMIT");
}

#[test]
fn dynamic_values_are_mixed() {
    for value in [
        "$user",
        "$this->user",
        "$this?->user",
        "User::$current",
        "User::ROLE",
        "$rows[0]",
        "$repo->find($id)",
        "$repo?->find($id)",
        "User::find(1)",
        "load_user()",
    ] {
        assert_classified(value, TypeKind::Unknown, "mixed");
    }
}

#[test]
fn casts_use_normalized_target() {
    assert_classified("(int) $x", TypeKind::LiteralPrimitive, "int");
    assert_classified("(integer) $x", TypeKind::LiteralPrimitive, "int");
    assert_classified("(bool) $x", TypeKind::LiteralPrimitive, "bool");
    assert_classified("(array) $x", TypeKind::Array, "array");
    assert_classified("(object) $x", TypeKind::Entity, "object");
}

#[test]
fn unrecognized_shapes_are_unclassified() {
    let result = resolve_snippet("$smarty->assign('v', fn() => 1);\n", "v");
    let Resolution::Unclassified(site) = result else {
        panic!("expected unclassified, got {result:?}");
    };
    assert_eq!(site.line, 2);

    let result = resolve_snippet("$smarty->assign('v', $a + $b);\n", "v");
    assert!(matches!(result, Resolution::Unclassified(_)));
}

#[test]
fn keyed_array_structure_and_projection() {
    let body = r"$smarty->assign('product', [
    'id' => 7,
    'name' => 'Lamp',
    'owner' => new User(),
    'tags' => ['a', 'b'],
    5 => 'ignored',
]);
";
    let desc = describe_snippet(body, "product");
    let structure = desc.structure.as_ref().unwrap();
    let keys: Vec<_> = structure.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["id", "name", "owner", "tags"]);
    assert_eq!(desc.field("id").unwrap().type_name, "int");
    assert_eq!(desc.field("id").unwrap().source_line, Some(3));

    let owner = describe_snippet(body, "product.owner");
    assert!(owner.is_entity);
    assert_eq!(owner.type_name, "User");

    let missing = describe_snippet(body, "product.price");
    assert_eq!(missing.kind, TypeKind::Unknown);
    assert_eq!(missing.source_line, Some(2));
}
