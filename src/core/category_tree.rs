//! Category hierarchy built from a flat or partially nested category list.

use crate::domain::model::{Category, Id};
use crate::utils::error::{MarketError, Result};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    categories: HashMap<Id, Category>,
    children: HashMap<Id, Vec<Id>>,
    roots: Vec<Id>,
}

/// 移除 `parent`/`children` 展開後的副本
fn detached(category: &Category) -> Category {
    Category {
        parent: None,
        children: None,
        ..category.clone()
    }
}

fn collect_expansions(category: &Category, out: &mut Vec<Category>) {
    if let Some(parent) = &category.parent {
        out.push(detached(parent));
        collect_expansions(parent, out);
    }
    for child in category.children.iter().flatten() {
        out.push(detached(child));
        collect_expansions(child, out);
    }
}

impl CategoryTree {
    /// 建立分類索引，拒絕重複的 id 或 slug、不存在的父分類，以及無法回到根節點的父鏈
    ///
    /// 展開的 `parent`/`children` 若 id 未出現在頂層，會一併收入
    pub fn build(categories: Vec<Category>) -> Result<Self> {
        let mut tree = CategoryTree::default();
        let mut slugs = HashSet::new();

        let mut expansions = Vec::new();
        for category in &categories {
            collect_expansions(category, &mut expansions);
        }

        for category in categories {
            if tree.categories.contains_key(&category.id) {
                return Err(MarketError::DuplicateCategory {
                    field: "id".to_string(),
                    value: category.id.to_string(),
                });
            }
            if !slugs.insert(category.slug.clone()) {
                return Err(MarketError::DuplicateCategory {
                    field: "slug".to_string(),
                    value: category.slug.clone(),
                });
            }
            tree.categories.insert(category.id, detached(&category));
        }

        for category in expansions {
            if tree.categories.contains_key(&category.id) {
                continue;
            }
            if !slugs.insert(category.slug.clone()) {
                return Err(MarketError::DuplicateCategory {
                    field: "slug".to_string(),
                    value: category.slug.clone(),
                });
            }
            tree.categories.insert(category.id, category);
        }

        tree.check_parents()?;
        tree.check_cycles()?;
        tree.link();

        tracing::debug!(
            "Built category tree: {} categories, {} roots",
            tree.categories.len(),
            tree.roots.len()
        );
        Ok(tree)
    }

    fn check_parents(&self) -> Result<()> {
        for category in self.categories.values() {
            if let Some(parent_id) = category.parent_id {
                if !self.categories.contains_key(&parent_id) {
                    return Err(MarketError::UnknownParent {
                        id: category.id,
                        parent_id,
                    });
                }
            }
        }
        Ok(())
    }

    /// 無環的父鏈必定在分類數量以內的步數回到根節點
    fn check_cycles(&self) -> Result<()> {
        let limit = self.categories.len();
        let mut ids: Vec<Id> = self.categories.keys().copied().collect();
        ids.sort_unstable();

        for id in ids {
            let mut current = self.categories.get(&id).and_then(|c| c.parent_id);
            let mut hops = 0;
            while let Some(parent_id) = current {
                hops += 1;
                if hops > limit || parent_id == id {
                    return Err(MarketError::CategoryCycle { id });
                }
                current = self.categories.get(&parent_id).and_then(|c| c.parent_id);
            }
        }
        Ok(())
    }

    fn link(&mut self) {
        let mut ids: Vec<Id> = self.categories.keys().copied().collect();
        ids.sort_by(|a, b| {
            let (ca, cb) = (&self.categories[a], &self.categories[b]);
            ca.name.cmp(&cb.name).then(ca.id.cmp(&cb.id))
        });

        for id in ids {
            match self.categories[&id].parent_id {
                Some(parent_id) => self.children.entry(parent_id).or_default().push(id),
                None => self.roots.push(id),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, id: Id) -> Option<&Category> {
        self.categories.get(&id)
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<&Category> {
        self.categories.values().find(|category| category.slug == slug)
    }

    /// 頂層分類，依名稱排序
    pub fn roots(&self) -> Vec<&Category> {
        self.roots.iter().map(|id| &self.categories[id]).collect()
    }

    /// `id` 的直接子分類，依名稱排序
    pub fn children(&self, id: Id) -> Vec<&Category> {
        self.children
            .get(&id)
            .map(|ids| ids.iter().map(|child| &self.categories[child]).collect())
            .unwrap_or_default()
    }

    /// `id` 的父鏈，最近的父分類在前
    pub fn ancestors(&self, id: Id) -> Vec<&Category> {
        let mut chain = Vec::new();
        let mut current = self.get(id).and_then(|c| c.parent_id);
        while let Some(parent_id) = current {
            match self.get(parent_id) {
                Some(parent) => {
                    chain.push(parent);
                    current = parent.parent_id;
                }
                None => break,
            }
        }
        chain
    }

    /// 從根節點到 `id` 的路徑 (含自身)，未知 id 回傳空
    pub fn breadcrumb(&self, id: Id) -> Vec<&Category> {
        let Some(category) = self.get(id) else {
            return Vec::new();
        };
        let mut path = self.ancestors(id);
        path.reverse();
        path.push(category);
        path
    }

    /// 祖先數量，根節點深度為 0
    pub fn depth(&self, id: Id) -> Option<usize> {
        self.get(id).map(|_| self.ancestors(id).len())
    }

    /// Every category below `id`, in depth-first order.
    pub fn descendants(&self, id: Id) -> Vec<&Category> {
        let mut out = Vec::new();
        let mut stack: Vec<Id> = self.children.get(&id).cloned().unwrap_or_default();
        stack.reverse();
        while let Some(next) = stack.pop() {
            out.push(&self.categories[&next]);
            if let Some(grandchildren) = self.children.get(&next) {
                stack.extend(grandchildren.iter().rev());
            }
        }
        out
    }

    /// Whole forest in depth-first order, paired with each node's depth.
    pub fn walk(&self) -> Vec<(usize, &Category)> {
        let mut out = Vec::new();
        for root in self.roots() {
            out.push((0, root));
            for descendant in self.descendants(root.id) {
                let depth = self.depth(descendant.id).unwrap_or_default();
                out.push((depth, descendant));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::category;

    fn sample() -> Vec<Category> {
        vec![
            category(1, "Vehicles", None),
            category(2, "Electronics", None),
            category(3, "Bikes", Some(1)),
            category(4, "Cars", Some(1)),
            category(5, "Mountain Bikes", Some(3)),
            category(6, "Phones", Some(2)),
        ]
    }

    #[test]
    fn test_roots_and_children_are_sorted_by_name() {
        let tree = CategoryTree::build(sample()).unwrap();
        let roots: Vec<&str> = tree.roots().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(roots, vec!["Electronics", "Vehicles"]);

        let children: Vec<Id> = tree.children(1).iter().map(|c| c.id).collect();
        assert_eq!(children, vec![3, 4]);
        assert!(tree.children(5).is_empty());
    }

    #[test]
    fn test_ancestors_and_breadcrumb() {
        let tree = CategoryTree::build(sample()).unwrap();
        let ancestors: Vec<Id> = tree.ancestors(5).iter().map(|c| c.id).collect();
        assert_eq!(ancestors, vec![3, 1]);

        let crumbs: Vec<&str> = tree.breadcrumb(5).iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(crumbs, vec!["vehicles", "bikes", "mountain-bikes"]);

        assert_eq!(tree.depth(1), Some(0));
        assert_eq!(tree.depth(5), Some(2));
        assert_eq!(tree.depth(99), None);
    }

    #[test]
    fn test_descendants_and_walk() {
        let tree = CategoryTree::build(sample()).unwrap();
        let below: Vec<Id> = tree.descendants(1).iter().map(|c| c.id).collect();
        assert_eq!(below, vec![3, 5, 4]);

        let walked: Vec<(usize, Id)> = tree.walk().iter().map(|(d, c)| (*d, c.id)).collect();
        assert_eq!(walked, vec![(0, 2), (1, 6), (0, 1), (1, 3), (2, 5), (1, 4)]);
    }

    #[test]
    fn test_unknown_parent_is_rejected() {
        let mut categories = sample();
        categories.push(category(7, "Boats", Some(42)));
        assert!(matches!(
            CategoryTree::build(categories),
            Err(MarketError::UnknownParent { id: 7, parent_id: 42 })
        ));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let categories = vec![
            category(1, "A", Some(3)),
            category(2, "B", Some(1)),
            category(3, "C", Some(2)),
            category(4, "D", None),
        ];
        assert!(matches!(
            CategoryTree::build(categories),
            Err(MarketError::CategoryCycle { .. })
        ));
    }

    #[test]
    fn test_chains_terminate_within_category_count() {
        // 單一長鏈：1 <- 2 <- ... <- 50
        let categories: Vec<Category> = (1..=50)
            .map(|id| category(id, &format!("Level {}", id), (id > 1).then(|| id - 1)))
            .collect();
        let tree = CategoryTree::build(categories).unwrap();
        assert_eq!(tree.ancestors(50).len(), 49);
        assert!(tree.ancestors(50).len() < tree.len());
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let mut categories = sample();
        categories.push(category(1, "Other", None));
        assert!(matches!(
            CategoryTree::build(categories),
            Err(MarketError::DuplicateCategory { .. })
        ));

        let mut categories = sample();
        categories.push(category(8, "Bikes", None));
        assert!(matches!(
            CategoryTree::build(categories),
            Err(MarketError::DuplicateCategory { ref field, .. }) if field == "slug"
        ));
    }

    #[test]
    fn test_nested_children_are_folded_in() {
        let mut vehicles = category(1, "Vehicles", None);
        let mut bikes = category(3, "Bikes", Some(1));
        bikes.children = Some(vec![category(5, "Mountain Bikes", Some(3))]);
        vehicles.children = Some(vec![bikes]);

        let tree = CategoryTree::build(vec![vehicles]).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.find_by_slug("mountain-bikes").map(|c| c.id), Some(5));
        assert!(tree.get(1).unwrap().children.is_none());
    }
}
