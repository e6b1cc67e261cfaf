//! Tests for the arena layer tree
//!
//! Covers decoding with parent links, fatal unknown children, encoding of
//! the `layers` arrays, traversal order and editing.

#[cfg(test)]
mod tests {
    use crate::models::layer::{Bitmap, Group, Layer, Oval, Text};
    use crate::models::layer_tree::{LayerId, LayerTree};
    use crate::models::query::LayerFilter;
    use crate::models::schema::SchemaError;
    use serde_json::{json, Value};

    fn sample() -> Value {
        json!([
            {"_class": "artboard", "name": "Board", "layers": [
                {"_class": "group", "name": "Header", "layers": [
                    {"_class": "text", "name": "Title"},
                    {"_class": "bitmap", "name": "Logo"}
                ]},
                {"_class": "oval", "name": "Dot"}
            ]},
            {"_class": "rectangle", "name": "Loose"}
        ])
    }

    fn names(tree: &LayerTree, ids: &[LayerId]) -> Vec<String> {
        ids.iter()
            .map(|&id| tree.get(id).unwrap().name().to_string())
            .collect()
    }

    fn layer(name: &str) -> Layer {
        Layer::from(Text {
            name: name.to_string(),
            ..Text::default()
        })
    }

    // ========================================================================
    // Decoding
    // ========================================================================

    #[test]
    fn test_decode_builds_order_and_parent_links() {
        let tree = LayerTree::decode(&sample()).unwrap();
        assert_eq!(tree.len(), 6);
        assert_eq!(names(&tree, tree.children(None)), vec!["Board", "Loose"]);

        let board = tree.children(None)[0];
        let header = tree.children(Some(board))[0];
        let logo = tree.children(Some(header))[1];

        assert_eq!(tree.get(logo).unwrap().class(), "bitmap");
        assert_eq!(tree.parent(logo), Some(header));
        assert_eq!(tree.parent(header), Some(board));
        assert_eq!(tree.parent(board), None);
        assert_eq!(tree.ancestors(logo), vec![header, board]);
        assert_eq!(tree.root_of(logo), Some(board));
    }

    #[test]
    fn test_decode_non_array_is_empty() {
        assert!(LayerTree::decode(&json!(null)).unwrap().is_empty());
        assert!(LayerTree::decode(&json!({"_class": "group"})).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_child_anywhere_is_fatal() {
        let input = json!([
            {"_class": "group", "layers": [
                {"_class": "oval"},
                {"_class": "hologram", "name": "?"}
            ]}
        ]);
        assert_eq!(
            LayerTree::decode(&input),
            Err(SchemaError::unknown_layer_type("hologram"))
        );
    }

    #[test]
    fn test_leaf_layers_key_is_ignored() {
        let tree = LayerTree::decode(&json!([
            {"_class": "text", "layers": [{"_class": "oval"}]}
        ]))
        .unwrap();
        assert_eq!(tree.len(), 1);
    }

    // ========================================================================
    // Encoding
    // ========================================================================

    #[test]
    fn test_encode_preserves_order_and_nesting() {
        let tree = LayerTree::decode(&sample()).unwrap();
        let encoded = tree.to_values();

        assert_eq!(encoded.len(), 2);
        assert_eq!(encoded[0]["_class"], "artboard");
        assert_eq!(encoded[0]["layers"][0]["layers"][1]["name"], "Logo");
        assert_eq!(encoded[0]["layers"][1]["_class"], "oval");
        assert!(encoded[1].get("layers").is_none());

        let again = LayerTree::decode(&Value::Array(encoded)).unwrap();
        assert_eq!(again, tree);
    }

    #[test]
    fn test_empty_container_still_has_layers_array() {
        let tree = LayerTree::decode(&json!([{"_class": "group"}])).unwrap();
        assert_eq!(tree.to_values()[0]["layers"], json!([]));
    }

    // ========================================================================
    // Traversal & Query
    // ========================================================================

    #[test]
    fn test_depth_first_is_pre_order() {
        let tree = LayerTree::decode(&sample()).unwrap();
        assert_eq!(
            names(&tree, &tree.depth_first(None)),
            vec!["Board", "Header", "Title", "Logo", "Dot", "Loose"]
        );

        let board = tree.children(None)[0];
        assert_eq!(
            names(&tree, &tree.depth_first(Some(board))),
            vec!["Header", "Title", "Logo", "Dot"]
        );
    }

    #[test]
    fn test_find_ordering_and_filters() {
        let tree = LayerTree::decode(&json!([
            {"_class": "group", "name": "Foo"},
            {"_class": "oval", "name": "FooBar"},
            {"_class": "bitmap", "name": "Img"}
        ]))
        .unwrap();
        let [a, b, c] = [tree.children(None)[0], tree.children(None)[1], tree.children(None)[2]];

        assert_eq!(tree.find(None, &LayerFilter::new().with_pattern("Foo")), vec![a, b]);
        assert_eq!(tree.find(None, &LayerFilter::new().with_class("bitmap")), vec![c]);
        assert_eq!(tree.find(None, &LayerFilter::new().with_name("Img")), vec![c]);
        assert_eq!(tree.find(None, &LayerFilter::new()), vec![a, b, c]);
    }

    #[test]
    fn test_find_descends_only_into_containers() {
        let tree = LayerTree::decode(&sample()).unwrap();
        let bitmaps = tree.find(None, &LayerFilter::new().with_class("bitmap"));
        assert_eq!(names(&tree, &bitmaps), vec!["Logo"]);

        let loose = tree.children(None)[1];
        assert!(tree.find(Some(loose), &LayerFilter::new()).is_empty());
    }

    #[test]
    fn test_find_by_object_id() {
        let tree = LayerTree::decode(&json!([
            {"_class": "group", "do_objectID": "G", "layers": [
                {"_class": "oval", "do_objectID": "O"}
            ]}
        ]))
        .unwrap();
        let oval = tree.find_by_object_id(&"O".into()).unwrap();
        assert_eq!(tree.get(oval).unwrap().class(), "oval");
        assert_eq!(tree.find_by_object_id(&"missing".into()), None);
    }

    // ========================================================================
    // Editing
    // ========================================================================

    #[test]
    fn test_insert_push_and_clamp() {
        let mut tree = LayerTree::new();
        let group = tree.push(None, Layer::from(Group::default())).unwrap();
        tree.push(Some(group), layer("b")).unwrap();
        tree.insert(Some(group), 0, layer("a")).unwrap();
        tree.insert(Some(group), 99, layer("c")).unwrap();

        assert_eq!(names(&tree, tree.children(Some(group))), vec!["a", "b", "c"]);
        for &child in tree.children(Some(group)) {
            assert_eq!(tree.parent(child), Some(group));
        }
    }

    #[test]
    fn test_insert_under_leaf_is_rejected() {
        let mut tree = LayerTree::new();
        let oval = tree.push(None, Layer::from(Oval::default())).unwrap();
        assert_eq!(
            tree.push(Some(oval), layer("x")),
            Err(SchemaError::not_a_container("oval"))
        );
    }

    #[test]
    fn test_remove_drops_subtree_and_invalidates_handles() {
        let mut tree = LayerTree::decode(&sample()).unwrap();
        let board = tree.children(None)[0];
        let header = tree.children(Some(board))[0];
        let title = tree.children(Some(header))[0];

        let removed = tree.remove(header).unwrap();
        assert_eq!(removed.name(), "Header");
        assert!(!tree.contains(title));
        assert_eq!(tree.len(), 3);
        assert_eq!(names(&tree, tree.children(Some(board))), vec!["Dot"]);
        assert_eq!(tree.remove(header), Err(SchemaError::layer_not_found(header)));
        assert_eq!(tree.get(title), None);
    }

    #[test]
    fn test_move_relinks_parent() {
        let mut tree = LayerTree::decode(&sample()).unwrap();
        let board = tree.children(None)[0];
        let header = tree.children(Some(board))[0];
        let loose = tree.children(None)[1];

        tree.move_layer(loose, Some(header), 0).unwrap();
        assert_eq!(tree.parent(loose), Some(header));
        assert_eq!(names(&tree, tree.children(None)), vec!["Board"]);
        assert_eq!(
            names(&tree, tree.children(Some(header))),
            vec!["Loose", "Title", "Logo"]
        );

        tree.move_layer(loose, None, 0).unwrap();
        assert_eq!(tree.parent(loose), None);
        assert_eq!(names(&tree, tree.children(None)), vec!["Loose", "Board"]);
    }

    #[test]
    fn test_move_under_descendant_is_cycle() {
        let mut tree = LayerTree::decode(&sample()).unwrap();
        let board = tree.children(None)[0];
        let header = tree.children(Some(board))[0];

        assert_eq!(
            tree.move_layer(board, Some(header), 0),
            Err(SchemaError::cycle_detected(board))
        );
        assert_eq!(
            tree.move_layer(header, Some(header), 0),
            Err(SchemaError::cycle_detected(header))
        );
        // Unchanged after the rejected moves
        assert_eq!(tree, LayerTree::decode(&sample()).unwrap());
    }

    #[test]
    fn test_structural_equality_ignores_handles() {
        let mut built = LayerTree::new();
        let bitmap = Layer::from(Bitmap {
            name: "Pic".to_string(),
            ..Bitmap::default()
        });
        let scratch = built.push(None, layer("scratch")).unwrap();
        built.push(None, bitmap.clone()).unwrap();
        built.remove(scratch).unwrap();

        let mut fresh = LayerTree::new();
        fresh.push(None, bitmap).unwrap();
        assert_eq!(built, fresh);
    }
}
