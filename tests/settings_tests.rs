mod common;

use pretty_assertions::assert_eq;

use rm_catalog::domain::{Settings, SettingsManager, ThemeColor};
use rm_catalog::service::{KvSettingsManager, SETTINGS_KEY};

#[tokio::test]
async fn first_load_persists_defaults() {
    let db = common::temp_db("settings-defaults").await;
    let manager = KvSettingsManager::load(db.key_value()).await.unwrap();

    assert_eq!(manager.settings(), Settings::default());
    let stored = db.key_value().get(SETTINGS_KEY).await.unwrap().unwrap();
    let parsed: Settings = serde_json::from_str(&stored).unwrap();
    assert_eq!(parsed, Settings::default());
}

#[tokio::test]
async fn save_publishes_and_survives_reload() {
    let db = common::temp_db("settings-save").await;
    let manager = KvSettingsManager::load(db.key_value()).await.unwrap();
    let mut rx = manager.subscribe();

    let teal = ThemeColor::rgb(0x00, 0x80, 0x80);
    let saved = manager
        .save(Box::new(move |s: Settings| Settings {
            your_character_id: Some(1),
            dark_theme_color: Some(teal),
            ..s
        }))
        .await
        .unwrap();
    assert_eq!(saved.your_character_id, Some(1));

    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow(), saved);

    let stored = db.key_value().get(SETTINGS_KEY).await.unwrap().unwrap();
    assert!(stored.contains("\"yourCharacterId\":1"));
    assert!(stored.contains("#008080"));

    let reloaded = KvSettingsManager::load(db.key_value()).await.unwrap();
    assert_eq!(reloaded.settings(), saved);
}

#[tokio::test]
async fn malformed_blob_falls_back_to_defaults() {
    let db = common::temp_db("settings-garbage").await;
    db.key_value().put(SETTINGS_KEY, "{not json").await.unwrap();

    let manager = KvSettingsManager::load(db.key_value()).await.unwrap();
    assert_eq!(manager.settings(), Settings::default());

    // Unknown fields and partial records are tolerated.
    db.key_value()
        .put(SETTINGS_KEY, r##"{"lightThemeColor":"#112233","extra":true}"##)
        .await
        .unwrap();
    let manager = KvSettingsManager::load(db.key_value()).await.unwrap();
    assert_eq!(
        manager.settings().light_theme_color,
        Some(ThemeColor::rgb(0x11, 0x22, 0x33))
    );
    assert_eq!(manager.settings().your_character_id, None);
}
