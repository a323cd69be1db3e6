use tracing::{info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Category, MenuItem, MenuItemCreate, MenuItemPatch};
use crate::menu_actor::MenuError;

#[derive(Clone)]
pub struct MenuClient {
    inner: ResourceClient<MenuItem>,
}

impl MenuClient {
    /// Menu ordered by category, then name; optionally one category only.
    #[instrument(skip(self))]
    pub async fn list_menu(&self, category: Option<Category>) -> Result<Vec<MenuItem>, MenuError> {
        let mut items = self.inner.list().await?;
        if let Some(category) = category {
            items.retain(|item| item.category == category);
        }
        items.sort_by(|a, b| {
            a.category
                .as_str()
                .cmp(b.category.as_str())
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(items)
    }

    #[instrument(skip(self))]
    pub async fn by_category(&self, category: &str) -> Result<Vec<MenuItem>, MenuError> {
        let category: Category = category.parse()?;
        self.list_menu(Some(category)).await
    }

    #[instrument(skip(self, item), fields(name = %item.name))]
    pub async fn create_menu_item(&self, item: MenuItemCreate) -> Result<MenuItem, MenuError> {
        let created = self.inner.create(item).await?;
        info!(id = created.id, "Menu item added");
        Ok(created)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_menu_item(&self, key: String, patch: MenuItemPatch) -> Result<MenuItem, MenuError> {
        let updated = self.inner.update(key, patch).await?;
        info!(id = updated.id, "Menu item updated");
        Ok(updated)
    }
}

crate::impl_basic_client!(MenuClient, MenuItem, MenuError, menu_item);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::ResourceActor;
    use rust_decimal::Decimal;

    fn spawn_menu() -> MenuClient {
        let (mut actor, inner) = ResourceActor::<MenuItem>::new("menu", 16, |last| last.map_or(1, |id| id + 1));
        actor.seed(crate::menu_actor::default_menu()).unwrap();
        tokio::spawn(actor.run());
        MenuClient::new(inner)
    }

    #[tokio::test]
    async fn test_list_menu_is_grouped_and_sorted() {
        let client = spawn_menu();

        let items = client.list_menu(None).await.unwrap();
        assert!(!items.is_empty());
        let first_hot = items.iter().position(|i| i.category == Category::Hot).unwrap();
        assert!(items[..first_hot].iter().all(|i| i.category == Category::Cold));
        assert!(items[first_hot..].iter().all(|i| i.category == Category::Hot));
        assert!(items[first_hot..].windows(2).all(|w| w[0].name <= w[1].name));
    }

    #[tokio::test]
    async fn test_shutdown_stops_the_actor() {
        let (actor, inner) = ResourceActor::<MenuItem>::new("menu", 4, |last| last.map_or(1, |id| id + 1));
        let handle = tokio::spawn(actor.run());
        let client = MenuClient::new(inner);

        client.shutdown().await.unwrap();
        handle.await.unwrap();

        let err = client.list_menu(None).await.unwrap_err();
        assert!(matches!(err, MenuError::ActorCommunicationError(_)));
    }

    #[tokio::test]
    async fn test_by_category_rejects_unknown() {
        let client = spawn_menu();

        let hot = client.by_category("HOT").await.unwrap();
        assert!(hot.iter().all(|i| i.category == Category::Hot));

        let err = client.by_category("lukewarm").await.unwrap_err();
        assert_eq!(err, MenuError::InvalidCategory("lukewarm".to_string()));
    }

    #[tokio::test]
    async fn test_crud_round() {
        let client = spawn_menu();

        let created = client
            .create_menu_item(MenuItemCreate::new("Flat White", Decimal::from(60), Category::Hot))
            .await
            .unwrap();
        let updated = client
            .update_menu_item(
                created.id.to_string(),
                MenuItemPatch {
                    category: Some(Category::Cold),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.category, Category::Cold);
        assert_eq!(updated.name, "Flat White");

        client.delete_menu_item(created.id.to_string()).await.unwrap();
        assert_eq!(client.get_menu_item(created.id.to_string()).await.unwrap(), None);

        let err = client.delete_menu_item(created.id.to_string()).await.unwrap_err();
        assert!(matches!(err, MenuError::NotFound(_)));
    }
}
