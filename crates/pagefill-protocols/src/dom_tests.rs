use super::*;

fn sample() -> DomTree {
    DomTree::from_specs([NodeSpec::element("html").children([
        NodeSpec::element("head").children([
            NodeSpec::element("title").with_text("  Contact \n Us  "),
            NodeSpec::element("meta")
                .attr("name", "description")
                .attr("content", "Reach our team"),
        ]),
        NodeSpec::element("body").child(
            NodeSpec::element("form").attr("id", "f").children([
                NodeSpec::element("label").attr("for", "email").with_text("Email"),
                NodeSpec::text("\n"),
                NodeSpec::other(),
                NodeSpec::element("input")
                    .attr("ID", "email")
                    .attr("value", "a@b.c")
                    .backend_id(42),
                NodeSpec::element("textarea").with_text("hello"),
            ]),
        ),
    ])])
}

#[test]
fn test_title_collapses_whitespace() {
    assert_eq!(sample().title(), "Contact Us");
}

#[test]
fn test_title_missing() {
    assert_eq!(DomTree::new().title(), "");
}

#[test]
fn test_meta_content() {
    let tree = sample();
    assert_eq!(tree.meta_content("description"), Some("Reach our team"));
    assert_eq!(tree.meta_content("keywords"), None);
}

#[test]
fn test_elements_by_tag_document_order() {
    let tree = sample();
    let found = tree.elements_by_tag(&["textarea", "label", "input"]);
    let tags: Vec<_> = found.iter().map(|id| tree.tag(*id).unwrap()).collect();
    assert_eq!(tags, vec!["label", "input", "textarea"]);
}

#[test]
fn test_attribute_is_case_insensitive() {
    let tree = sample();
    let input = tree.elements_by_tag(&["input"])[0];
    assert_eq!(tree.attribute(input, "id"), Some("email"));
}

#[test]
fn test_closest_and_ancestors() {
    let tree = sample();
    let input = tree.elements_by_tag(&["input"])[0];
    let form = tree.closest(input, &["div", "form", "section"]).unwrap();
    assert_eq!(tree.tag(form), Some("form"));

    let chain: Vec<_> = tree
        .ancestors(input)
        .map(|id| tree.tag(id).unwrap().to_string())
        .collect();
    assert_eq!(chain, vec!["form", "body", "html"]);
}

#[test]
fn test_closest_includes_self() {
    let tree = sample();
    let form = tree.elements_by_tag(&["form"])[0];
    assert_eq!(tree.closest(form, &["form"]), Some(form));
}

#[test]
fn test_parent_element_stops_at_document() {
    let tree = sample();
    let html = tree.elements_by_tag(&["html"])[0];
    assert_eq!(tree.parent(html), Some(tree.root()));
    assert_eq!(tree.parent_element(html), None);
}

#[test]
fn test_previous_element_siblings_skip_text_and_other() {
    let tree = sample();
    let input = tree.elements_by_tag(&["input"])[0];
    let previous: Vec<_> = tree.previous_element_siblings(input).collect();
    assert_eq!(previous.len(), 1);
    assert_eq!(tree.tag(previous[0]), Some("label"));
}

#[test]
fn test_text_content_concatenates_descendants() {
    let tree = DomTree::from_specs([NodeSpec::element("div")
        .with_text("a")
        .child(NodeSpec::element("span").with_text("b"))
        .with_text("c")]);
    let div = tree.elements_by_tag(&["div"])[0];
    assert_eq!(tree.text_content(div), "abc");
}

#[test]
fn test_form_value() {
    let tree = sample();
    let input = tree.elements_by_tag(&["input"])[0];
    let textarea = tree.elements_by_tag(&["textarea"])[0];
    assert_eq!(tree.form_value(input), "a@b.c");
    assert_eq!(tree.form_value(textarea), "hello");
}

#[test]
fn test_find_by_backend_id() {
    let tree = sample();
    let input = tree.elements_by_tag(&["input"])[0];
    assert_eq!(tree.find_by_backend_id(42), Some(input));
    assert_eq!(tree.find_by_backend_id(7), None);
}

#[test]
fn test_empty_tree() {
    let tree = DomTree::new();
    assert!(tree.is_empty());
    assert!(tree.descendants(tree.root()).is_empty());
    assert!(!sample().is_empty());
}
