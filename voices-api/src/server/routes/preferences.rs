use crate::server::{Result, ServerRouter, SessionPreferences, json::Json};
use axum::{Router, extract::State};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use voices_common::model::{
    ValidationError,
    preferences::{FontSize, Language, NotificationsUpdate, Preferences, PrivacyUpdate, Theme},
};
use voices_store::{preferences::Persisted, presentation::PresentationClasses};

type SharedPreferences = State<Arc<Mutex<SessionPreferences>>>;

pub fn routes() -> ServerRouter {
    Router::new()
        .typed_get(get_preferences)
        .typed_get(list_options)
        .typed_put(set_theme)
        .typed_put(set_font_size)
        .typed_put(set_language)
        .typed_patch(update_notifications)
        .typed_patch(update_privacy)
        .typed_put(set_ambient)
        .typed_post(reset_preferences)
}

#[derive(TypedPath)]
#[typed_path("/preferences")]
struct PreferencesPath;

#[derive(TypedPath)]
#[typed_path("/preferences/options")]
struct OptionsPath;

#[derive(TypedPath)]
#[typed_path("/preferences/theme")]
struct ThemePath;

#[derive(TypedPath)]
#[typed_path("/preferences/font-size")]
struct FontSizePath;

#[derive(TypedPath)]
#[typed_path("/preferences/language")]
struct LanguagePath;

#[derive(TypedPath)]
#[typed_path("/preferences/notifications")]
struct NotificationsPath;

#[derive(TypedPath)]
#[typed_path("/preferences/privacy")]
struct PrivacyPath;

#[derive(TypedPath)]
#[typed_path("/preferences/ambient")]
struct AmbientPath;

#[derive(TypedPath)]
#[typed_path("/preferences/reset")]
struct ResetPath;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct ValueBody {
    value: String,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AmbientBody {
    prefers_dark: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
struct PreferencesView {
    #[serde(flatten)]
    preferences: Preferences,
    effective_theme: &'static str,
    classes: [&'static str; 2],
    system_prefers_dark: bool,
    /// Whether the last write reached storage. Absent on plain reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    persisted: Option<bool>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Serialize)]
struct OptionView {
    value: &'static str,
    label: &'static str,
}

/// Every choice a settings screen offers, with its display label.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
struct OptionsView {
    themes: Vec<OptionView>,
    font_sizes: Vec<OptionView>,
    languages: Vec<OptionView>,
}

impl PreferencesView {
    fn new(store: &SessionPreferences) -> Self {
        let classes = store.classes();
        Self {
            preferences: *store.preferences(),
            effective_theme: store.effective_theme().class(),
            classes: Self::class_names(classes),
            system_prefers_dark: store.system_prefers_dark(),
            persisted: None,
        }
    }

    fn after_write(store: &SessionPreferences, persisted: &Persisted) -> Self {
        Self {
            persisted: Some(persisted.is_stored()),
            ..Self::new(store)
        }
    }

    fn class_names(classes: PresentationClasses) -> [&'static str; 2] {
        [classes.theme_class(), classes.font_class()]
    }
}

async fn get_preferences(
    _: PreferencesPath,
    State(preferences): SharedPreferences,
) -> Json<PreferencesView> {
    Json(PreferencesView::new(&*preferences.lock().await))
}

async fn list_options(_: OptionsPath) -> Json<OptionsView> {
    Json(OptionsView {
        themes: Theme::ALL
            .iter()
            .map(|theme| OptionView {
                value: theme.as_str(),
                label: theme.label(),
            })
            .collect(),
        font_sizes: FontSize::ALL
            .iter()
            .map(|font_size| OptionView {
                value: font_size.as_str(),
                label: font_size.label(),
            })
            .collect(),
        languages: Language::ALL
            .iter()
            .map(|language| OptionView {
                value: language.as_str(),
                label: language.label(),
            })
            .collect(),
    })
}

async fn set_theme(
    _: ThemePath,
    State(preferences): SharedPreferences,
    Json(body): Json<ValueBody>,
) -> Result<Json<PreferencesView>> {
    let theme = body
        .value
        .parse::<Theme>()
        .map_err(ValidationError::from)?;

    let mut preferences = preferences.lock().await;
    let persisted = preferences.set_theme(theme);
    Ok(Json(PreferencesView::after_write(&preferences, &persisted)))
}

async fn set_font_size(
    _: FontSizePath,
    State(preferences): SharedPreferences,
    Json(body): Json<ValueBody>,
) -> Result<Json<PreferencesView>> {
    let font_size = body
        .value
        .parse::<FontSize>()
        .map_err(ValidationError::from)?;

    let mut preferences = preferences.lock().await;
    let persisted = preferences.set_font_size(font_size);
    Ok(Json(PreferencesView::after_write(&preferences, &persisted)))
}

async fn set_language(
    _: LanguagePath,
    State(preferences): SharedPreferences,
    Json(body): Json<ValueBody>,
) -> Result<Json<PreferencesView>> {
    let language = body
        .value
        .parse::<Language>()
        .map_err(ValidationError::from)?;

    let mut preferences = preferences.lock().await;
    let persisted = preferences.set_language(language);
    Ok(Json(PreferencesView::after_write(&preferences, &persisted)))
}

async fn update_notifications(
    _: NotificationsPath,
    State(preferences): SharedPreferences,
    Json(update): Json<NotificationsUpdate>,
) -> Json<PreferencesView> {
    let mut preferences = preferences.lock().await;
    let persisted = preferences.update_notifications(update);
    Json(PreferencesView::after_write(&preferences, &persisted))
}

async fn update_privacy(
    _: PrivacyPath,
    State(preferences): SharedPreferences,
    Json(update): Json<PrivacyUpdate>,
) -> Json<PreferencesView> {
    let mut preferences = preferences.lock().await;
    let persisted = preferences.update_privacy(update);
    Json(PreferencesView::after_write(&preferences, &persisted))
}

async fn set_ambient(
    _: AmbientPath,
    State(preferences): SharedPreferences,
    Json(body): Json<AmbientBody>,
) -> Json<PreferencesView> {
    let mut preferences = preferences.lock().await;
    preferences.set_system_prefers_dark(body.prefers_dark);
    Json(PreferencesView::new(&preferences))
}

async fn reset_preferences(
    _: ResetPath,
    State(preferences): SharedPreferences,
) -> Json<PreferencesView> {
    let mut preferences = preferences.lock().await;
    let persisted = preferences.reset();
    Json(PreferencesView::after_write(&preferences, &persisted))
}

#[cfg(test)]
mod tests {
    use crate::server::test_util::TestApp;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn defaults_on_empty_storage() {
        let app = TestApp::new();

        let (status, body) = app.request(Method::GET, "/preferences", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["theme"], "system");
        assert_eq!(body["fontSize"], "medium");
        assert_eq!(body["language"], "en");
        assert_eq!(body["effectiveTheme"], "light");
        assert_eq!(body["classes"], json!(["light", "text-base"]));
        assert_eq!(body["notifications"]["mentions"], true);
        assert_eq!(body["privacy"]["showActivity"], false);
        assert!(body.get("persisted").is_none());
    }

    #[tokio::test]
    async fn options_carry_labels() {
        let app = TestApp::new();

        let (status, options) = app.request(Method::GET, "/preferences/options", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            options["themes"],
            json!([
                { "value": "light", "label": "Light" },
                { "value": "dark", "label": "Dark" },
                { "value": "system", "label": "System" },
            ])
        );
        assert_eq!(options["fontSizes"][1]["label"], "Medium (Recommended)");
        assert_eq!(options["languages"][3], json!({ "value": "ar", "label": "العربية" }));
    }

    #[tokio::test]
    async fn set_theme_switches_classes() {
        let app = TestApp::new();

        let (status, body) = app
            .request(
                Method::PUT,
                "/preferences/theme",
                Some(json!({ "value": "dark" })),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["theme"], "dark");
        assert_eq!(body["classes"], json!(["dark", "text-base"]));
        assert_eq!(body["persisted"], true);

        let preferences = app.state.preferences.lock().await;
        assert!(preferences.presentation().contains("dark"));
        assert!(!preferences.presentation().contains("light"));
    }

    #[tokio::test]
    async fn unknown_theme_is_rejected() {
        let app = TestApp::new();

        let (status, body) = app
            .request(
                Method::PUT,
                "/preferences/theme",
                Some(json!({ "value": "sepia" })),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);

        let (_, body) = app.request(Method::GET, "/preferences", None).await;
        assert_eq!(body["theme"], "system");
    }

    #[tokio::test]
    async fn partial_notification_update_keeps_other_flags() {
        let app = TestApp::new();

        let (status, body) = app
            .request(
                Method::PATCH,
                "/preferences/notifications",
                Some(json!({ "comments": false })),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["notifications"],
            json!({ "posts": true, "comments": false, "mentions": true })
        );
    }

    #[tokio::test]
    async fn ambient_signal_resolves_system_theme() {
        let app = TestApp::new();

        let (status, body) = app
            .request(
                Method::PUT,
                "/preferences/ambient",
                Some(json!({ "prefersDark": true })),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["theme"], "system");
        assert_eq!(body["effectiveTheme"], "dark");
        assert_eq!(body["systemPrefersDark"], true);
    }

    #[tokio::test]
    async fn preferences_survive_restart() {
        let app = TestApp::new();
        app.request(
            Method::PUT,
            "/preferences/font-size",
            Some(json!({ "value": "large" })),
        )
        .await;
        app.request(
            Method::PATCH,
            "/preferences/privacy",
            Some(json!({ "showActivity": true })),
        )
        .await;

        let restarted = TestApp::with_data_dir(app.data_dir);
        let (_, body) = restarted.request(Method::GET, "/preferences", None).await;

        assert_eq!(body["fontSize"], "large");
        assert_eq!(body["privacy"]["showActivity"], true);
        assert_eq!(body["classes"], json!(["light", "text-lg"]));
    }

    #[tokio::test]
    async fn reset_restores_defaults() {
        let app = TestApp::new();
        app.request(
            Method::PUT,
            "/preferences/language",
            Some(json!({ "value": "fr" })),
        )
        .await;

        let (status, body) = app.request(Method::POST, "/preferences/reset", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["language"], "en");
        assert_eq!(body["persisted"], true);

        let restarted = TestApp::with_data_dir(app.data_dir);
        let (_, body) = restarted.request(Method::GET, "/preferences", None).await;
        assert_eq!(body["language"], "en");
    }
}
