use rust_decimal::Decimal;

use crate::actor_framework::{Entity, Records};
use crate::domain::{MenuItem, MenuItemCreate, MenuItemPatch};
use super::MenuError;

fn check_price(price: Decimal) -> Result<Decimal, MenuError> {
    if price <= Decimal::ZERO {
        return Err(MenuError::ValidationError(format!("Price must be positive, got {}", price)));
    }
    Ok(price.round_dp(2))
}

/// Blank strings count as absent, both on create and in patches.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Entity for MenuItem {
    type Id = u64;
    type CreateParams = MenuItemCreate;
    type Patch = MenuItemPatch;
    type Action = ();
    type ActionResult = ();
    type Error = MenuError;
    type Session = ();

    fn id(&self) -> &u64 {
        &self.id
    }

    fn from_create_params(
        id: u64,
        params: MenuItemCreate,
        _existing: &Records<Self>,
        _session: &(),
    ) -> Result<Self, MenuError> {
        let name = params.name.trim().to_string();
        if name.is_empty() {
            return Err(MenuError::ValidationError("Name is required".to_string()));
        }

        Ok(Self {
            id,
            name,
            description: non_blank(params.description),
            price: check_price(params.price)?,
            category: params.category,
            image_url: non_blank(params.image_url),
        })
    }

    /// Updates only the fields present in the patch.
    ///
    /// # Errors
    /// Returns `ValidationError` for a non-positive price; the item is left
    /// untouched in that case.
    fn on_update(&mut self, patch: MenuItemPatch) -> Result<(), MenuError> {
        let price = patch.price.map(check_price).transpose()?;

        if let Some(name) = non_blank(patch.name) {
            self.name = name.trim().to_string();
        }
        if let Some(description) = non_blank(patch.description) {
            self.description = Some(description);
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(image_url) = non_blank(patch.image_url) {
            self.image_url = Some(image_url);
        }
        Ok(())
    }

    /// Menu items have no actions; every change goes through `on_update`.
    fn handle_action(&mut self, _action: ()) -> Result<(), MenuError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;

    fn espresso() -> MenuItem {
        MenuItem::from_create_params(
            1,
            MenuItemCreate::new("Espresso", Decimal::from(35), Category::Hot).describe("Short and strong"),
            &Records::<MenuItem>::new(),
            &(),
        )
        .unwrap()
    }

    #[test]
    fn test_create_validates() {
        let empty = Records::<MenuItem>::new();
        let blank = MenuItemCreate::new("  ", Decimal::from(35), Category::Hot);
        assert!(matches!(
            MenuItem::from_create_params(1, blank, &empty, &()),
            Err(MenuError::ValidationError(_))
        ));

        let free = MenuItemCreate::new("Water", Decimal::ZERO, Category::Cold);
        assert!(matches!(
            MenuItem::from_create_params(1, free, &empty, &()),
            Err(MenuError::ValidationError(_))
        ));
    }

    #[test]
    fn test_action_leaves_item_unchanged() {
        let mut item = espresso();
        let before = item.clone();
        item.handle_action(()).unwrap();
        assert_eq!(item, before);
    }

    #[test]
    fn test_patch_coalesces() {
        let mut item = espresso();
        item.on_update(MenuItemPatch {
            price: Some(Decimal::new(3850, 2)),
            description: Some(String::new()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(item.name, "Espresso");
        assert_eq!(item.price, Decimal::new(3850, 2));
        assert_eq!(item.description.as_deref(), Some("Short and strong"));
        assert_eq!(item.category, Category::Hot);
    }

    #[test]
    fn test_bad_patch_changes_nothing() {
        let mut item = espresso();
        let err = item
            .on_update(MenuItemPatch {
                name: Some("Doppio".to_string()),
                price: Some(Decimal::from(-1)),
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(err, MenuError::ValidationError(_)));
        assert_eq!(item.name, "Espresso");
    }
}
