use common::{Category, CategoryDraft, CategoryPatch};
use tracing::info;

use crate::{Catalog, CatalogError};

impl Catalog {
    pub fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.load()
    }

    pub fn get_category(&self, id: &str) -> Result<Category, CatalogError> {
        self.find(id)
    }

    pub fn create_category(&self, draft: CategoryDraft) -> Result<Category, CatalogError> {
        let category = self.insert(|id| draft.into_category(id))?;
        info!("Created category {} ({})", category.id, category.name);
        Ok(category)
    }

    pub fn update_category(
        &self,
        id: &str,
        patch: CategoryPatch,
    ) -> Result<Category, CatalogError> {
        self.modify(id, |category| patch.apply_to(category))
    }

    pub fn delete_category(&self, id: &str) -> Result<Category, CatalogError> {
        let removed: Category = self.remove(id)?;
        info!("Deleted category {} ({})", removed.id, removed.name);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use common::{CategoryDraft, CategoryPatch};
    use serde_json::json;

    use crate::store::Collection;
    use crate::testing::catalog_with;
    use crate::CatalogError;

    #[test]
    fn crud_round() {
        let (catalog, store) = catalog_with(vec![(
            Collection::Categories,
            json!([{ "id": "c1", "name": "Rock", "color": "#f00" }]),
        )]);

        let draft: CategoryDraft =
            serde_json::from_value(json!({ "name": "Jazz", "color": "#00f", "icon": "sax" }))
                .unwrap();
        let jazz = catalog.create_category(draft).unwrap();
        assert_eq!(jazz.extra.get("icon"), Some(&json!("sax")));
        assert_eq!(catalog.list_categories().unwrap().len(), 2);

        let patch: CategoryPatch = serde_json::from_value(json!({ "color": "#0f0" })).unwrap();
        let rock = catalog.update_category("c1", patch).unwrap();
        assert_eq!(rock.name, "Rock");
        assert_eq!(rock.color, "#0f0");

        catalog.delete_category("c1").unwrap();
        let remaining = store.document(Collection::Categories);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0]["name"], "Jazz");
    }

    #[test]
    fn missing_category_is_not_found() {
        let (catalog, _) = catalog_with(vec![]);
        assert!(matches!(catalog.get_category("x"), Err(CatalogError::NotFound("Category"))));
        assert!(matches!(
            catalog.update_category("x", CategoryPatch::default()),
            Err(CatalogError::NotFound("Category"))
        ));
        assert!(matches!(catalog.delete_category("x"), Err(CatalogError::NotFound("Category"))));
        assert!(catalog.list_categories().unwrap().is_empty());
    }
}
