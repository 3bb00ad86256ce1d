use crate::types::widget::{Widget, WidgetSettingsPatch};

use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct WidgetStore {
    inner: Mutex<Vec<Widget>>,
}

impl WidgetStore {
    pub fn find_by_token(&self, token: &str) -> Option<Widget> {
        let widgets = self.inner.lock().expect("widgets lock");
        widgets.iter().find(|widget| widget.token == token).cloned()
    }

    pub fn find_by_user(&self, user_id: &str) -> Option<Widget> {
        let widgets = self.inner.lock().expect("widgets lock");
        widgets
            .iter()
            .find(|widget| widget.user_id == user_id)
            .cloned()
    }

    pub fn insert(&self, widget: Widget) {
        self.inner.lock().expect("widgets lock").push(widget);
    }

    pub fn update_for_user(&self, user_id: &str, patch: WidgetSettingsPatch) -> Option<Widget> {
        let mut widgets = self.inner.lock().expect("widgets lock");
        let widget = widgets.iter_mut().find(|widget| widget.user_id == user_id)?;
        widget.apply(patch);
        Some(widget.clone())
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::types::widget::{WidgetPosition, WidgetSettings, WidgetTheme};

    #[test]
    fn update_for_user__should_merge_patch_into_settings() {
        // Given
        let store = WidgetStore::default();
        store.insert(Widget {
            user_id: "user1".to_string(),
            token: "fp_demo".to_string(),
            domain: None,
            settings: WidgetSettings::default(),
        });
        let patch = WidgetSettingsPatch {
            position: Some(WidgetPosition::TopLeft),
            domain: Some("https://shop.example".to_string()),
            ..Default::default()
        };

        // When
        let widget = store.update_for_user("user1", patch).expect("widget");

        // Then
        assert_eq!(widget.settings.position, WidgetPosition::TopLeft);
        assert_eq!(widget.settings.theme, WidgetTheme::Purple);
        assert_eq!(widget.domain.as_deref(), Some("https://shop.example"));
        let stored = store.find_by_token("fp_demo").expect("stored widget");
        assert_eq!(stored.settings.position, WidgetPosition::TopLeft);
    }

    #[test]
    fn update_for_user__should_return_none_for_unknown_user() {
        // Given
        let store = WidgetStore::default();

        // Then
        assert!(
            store
                .update_for_user("ghost", WidgetSettingsPatch::default())
                .is_none()
        );
    }
}
