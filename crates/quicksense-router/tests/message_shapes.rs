//! Wire shape tests: runtime messages and tab info must keep the JSON
//! field names the extension contexts exchange.

use quicksense_router::{InstallReason, PanelStatus, RuntimeMessage, TabInfo};
use serde_json::json;

/// `{ type: "GET_CONTENT" }`
#[test]
fn test_get_content_shape() {
    let value = serde_json::to_value(RuntimeMessage::GetContent).unwrap();
    assert_eq!(value, json!({"type": "GET_CONTENT"}));
}

/// `{ type: "PAGE_CONTENT", content: string }`
#[test]
fn test_page_content_shape() {
    let value = serde_json::to_value(RuntimeMessage::PageContent {
        content: "Hello".into(),
    })
    .unwrap();
    assert_eq!(value["type"], "PAGE_CONTENT");
    assert!(value["content"].is_string());
    assert_eq!(value.as_object().unwrap().len(), 2);
}

#[test]
fn test_panel_messages_parse() {
    let toggle: RuntimeMessage = serde_json::from_value(json!({"type": "TOGGLE_SIDE_PANEL"})).unwrap();
    assert_eq!(toggle, RuntimeMessage::ToggleSidePanel);

    let options: RuntimeMessage = serde_json::from_value(json!({"type": "OPEN_OPTIONS"})).unwrap();
    assert_eq!(options, RuntimeMessage::OpenOptions);

    assert!(serde_json::from_value::<RuntimeMessage>(json!({"type": "SUMMARIZE"})).is_err());
}

/// Tab as reported by the host: `{ id, windowId, url? }`
#[test]
fn test_tab_info_shape() {
    let tab: TabInfo = serde_json::from_value(json!({
        "id": 12,
        "windowId": 3,
        "url": "https://example.com/",
    }))
    .unwrap();
    assert_eq!(tab.window_id, 3);

    let no_url = serde_json::to_value(TabInfo {
        id: 1,
        window_id: 1,
        url: None,
    })
    .unwrap();
    assert!(no_url.get("url").is_none());
    assert!(no_url["windowId"].is_number());
}

#[test]
fn test_install_reason_and_panel_status() {
    let reason: InstallReason = serde_json::from_value(json!("install")).unwrap();
    assert_eq!(reason, InstallReason::Install);
    let reason: InstallReason = serde_json::from_value(json!("chrome_update")).unwrap();
    assert_eq!(reason, InstallReason::ChromeUpdate);

    assert_eq!(serde_json::to_value(PanelStatus::Open).unwrap(), "open");
    assert_eq!(PanelStatus::default(), PanelStatus::Closed);
}
