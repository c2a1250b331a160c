//! Two-level flattening of the marketplace category tree.

use dealhour_core::Category;

use crate::types::CategoryTreeNode;

/// Flattens the root's children and grandchildren into `{id, path}` entries.
///
/// Each top-level category is followed by its direct children as
/// `"Top > Child"`. Deeper levels are ignored.
#[must_use]
pub fn flatten_category_tree(root: &CategoryTreeNode) -> Vec<Category> {
    let mut flat = Vec::new();

    for top in &root.child_category_tree_nodes {
        let top_name = &top.category.category_name;
        flat.push(Category {
            id: top.category.category_id.clone(),
            path: top_name.clone(),
        });

        for child in &top.child_category_tree_nodes {
            flat.push(Category {
                id: child.category.category_id.clone(),
                path: format!("{top_name} > {}", child.category.category_name),
            });
        }
    }

    flat
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CategoryTreeResponse;

    #[test]
    fn flattens_two_levels_only() {
        let tree: CategoryTreeResponse = serde_json::from_value(serde_json::json!({
            "rootCategoryNode": {
                "category": { "categoryId": "0", "categoryName": "Root" },
                "childCategoryTreeNodes": [
                    {
                        "category": { "categoryId": "20081", "categoryName": "Antiques" },
                        "childCategoryTreeNodes": [
                            {
                                "category": { "categoryId": "37903", "categoryName": "Antiquities" },
                                "childCategoryTreeNodes": [
                                    { "category": { "categoryId": "999", "categoryName": "Deep" } }
                                ]
                            }
                        ]
                    },
                    { "category": { "categoryId": "550", "categoryName": "Art" } }
                ]
            }
        }))
        .unwrap();

        let flat = flatten_category_tree(&tree.root_category_node);

        let paths: Vec<(&str, &str)> = flat.iter().map(|c| (c.id.as_str(), c.path.as_str())).collect();
        assert_eq!(
            paths,
            vec![
                ("20081", "Antiques"),
                ("37903", "Antiques > Antiquities"),
                ("550", "Art"),
            ]
        );
    }
}
