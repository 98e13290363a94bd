//! Image → figure/figcaption rewrite

use super::tree::{try_map_elements, Element, Node};

/// Wrap every image that has alt text in a captioned `<figure>`.
///
/// The figure takes the image's slot in its parent. Images whose alt is
/// missing or blank are left as they are.
pub fn wrap_captioned_images(nodes: Vec<Node>) -> Vec<Node> {
    let result: Result<Vec<Node>, std::convert::Infallible> =
        try_map_elements(nodes, &mut |el| Ok(figure_for(el)));
    match result {
        Ok(nodes) => nodes,
        Err(never) => match never {},
    }
}

fn figure_for(el: Element) -> Node {
    if el.tag != "img" {
        return Node::Element(el);
    }

    let alt = match el.attr("alt") {
        Some(alt) if !alt.trim().is_empty() => alt.to_string(),
        _ => return Node::Element(el),
    };

    let caption = Element::new("figcaption")
        .with_attr("class", "image-caption")
        .with_child(Node::Text(alt));

    Node::Element(
        Element::new("figure")
            .with_attr("class", "image-figure")
            .with_child(Node::Element(el))
            .with_child(Node::Element(caption)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::markdown::tree::to_html;

    fn img(alt: Option<&str>) -> Element {
        let mut el = Element::new("img").with_attr("src", "x.png");
        if let Some(alt) = alt {
            el.set_attr("alt", alt);
        }
        el
    }

    #[test]
    fn test_wraps_image_with_alt() {
        let nodes = wrap_captioned_images(vec![Node::Element(img(Some("A photo")))]);
        assert_eq!(
            to_html(&nodes),
            "<figure class=\"image-figure\"><img src=\"x.png\" alt=\"A photo\" />\
             <figcaption class=\"image-caption\">A photo</figcaption></figure>\n"
        );
    }

    #[test]
    fn test_leaves_uncaptioned_images() {
        for alt in [None, Some(""), Some("   ")] {
            let original = vec![Node::Element(img(alt))];
            assert_eq!(wrap_captioned_images(original.clone()), original);
        }
    }

    #[test]
    fn test_keeps_sibling_position() {
        let paragraph = Element::new("p")
            .with_child(Node::Text("before ".to_string()))
            .with_child(Node::Element(img(Some("cap"))))
            .with_child(Node::Text(" after".to_string()));
        let nodes = wrap_captioned_images(vec![Node::Element(paragraph)]);

        let Node::Element(p) = &nodes[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.children.len(), 3);
        assert_eq!(p.children[0], Node::Text("before ".to_string()));
        let Node::Element(figure) = &p.children[1] else {
            panic!("expected figure");
        };
        assert_eq!(figure.tag, "figure");
        assert_eq!(figure.children[0], Node::Element(img(Some("cap"))));
        assert_eq!(figure.text_content(), "cap");
        assert_eq!(p.children[2], Node::Text(" after".to_string()));
    }
}
