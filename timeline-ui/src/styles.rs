#![cfg(target_arch = "wasm32")]

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Node};

const STYLE_TAG_SELECTOR: &str = "style[data-timeline-ui]";

/// CSS mặc định cho timeline, kèm các biến màu dễ ghi đè.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --timeline-font-family: 'Inter', system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
  --timeline-bg: #171717;
  --timeline-panel: rgba(23, 23, 23, 0.95);
  --timeline-surface: #262626;
  --timeline-surface-hover: #404040;
  --timeline-border: #262626;
  --timeline-border-strong: #404040;
  --timeline-text: #f5f5f5;
  --timeline-muted: #a3a3a3;
  --timeline-faint: #525252;
  --timeline-accent: #0284c7;
  --timeline-accent-hover: #0369a1;
  --timeline-tone-conflict: rgba(127, 29, 29, 0.4);
  --timeline-tone-conflict-hover: rgba(153, 27, 27, 0.6);
  --timeline-tone-economic: rgba(6, 78, 59, 0.4);
  --timeline-tone-economic-hover: rgba(6, 95, 70, 0.6);
  --timeline-tone-cultural: rgba(30, 58, 138, 0.4);
  --timeline-tone-cultural-hover: rgba(30, 64, 175, 0.6);
  --timeline-tone-political: rgba(12, 74, 110, 0.4);
  --timeline-tone-political-hover: rgba(7, 89, 133, 0.6);
  --timeline-region-europe: #60a5fa;
  --timeline-region-africa-middle-east: #f87171;
  --timeline-region-asia-pacific: #34d399;
  --timeline-region-americas: #a78bfa;
  --timeline-nav-height: 4rem;
  --timeline-axis-width: 5rem;
}

.app-shell {
  display: flex;
  flex-direction: column;
  height: 100vh;
  background: var(--timeline-bg);
  color: var(--timeline-text);
  font-family: var(--timeline-font-family);
}

.timeline-nav {
  position: sticky;
  top: 0;
  z-index: 50;
  display: flex;
  align-items: center;
  justify-content: space-between;
  height: var(--timeline-nav-height);
  padding: 0 1rem;
  background: var(--timeline-bg);
  border-bottom: 1px solid var(--timeline-border);
  box-shadow: 0 10px 15px -3px rgba(0, 0, 0, 0.4);
}

.nav-brand {
  font-size: 1.25rem;
  font-weight: 600;
  color: var(--timeline-text);
  text-decoration: none;
}

.nav-links {
  display: flex;
  gap: 2rem;
}

.nav-link {
  font-size: 0.875rem;
  font-weight: 500;
  color: var(--timeline-muted);
  text-decoration: none;
  padding-bottom: 0.25rem;
  border-bottom: 2px solid transparent;
  transition: color 0.15s ease;
}

.nav-link:hover {
  color: var(--timeline-text);
}

.nav-link[data-region="europe"] { color: var(--timeline-region-europe); }
.nav-link[data-region="africa-middle east"] { color: var(--timeline-region-africa-middle-east); }
.nav-link[data-region="asia pacific"] { color: var(--timeline-region-asia-pacific); }
.nav-link[data-region="americas"] { color: var(--timeline-region-americas); }

.nav-link.is-active {
  border-bottom-color: currentColor;
}

.timeline-root {
  display: flex;
  flex: 1;
  min-height: 0;
}

.tag-column {
  width: 12rem;
  flex-shrink: 0;
  border-right: 1px solid var(--timeline-border);
  overflow-y: auto;
}

.tag-menu {
  display: flex;
  flex-direction: column;
  height: 100%;
  background: var(--timeline-panel);
}

.tag-menu-header {
  padding: 0.5rem;
  border-bottom: 1px solid var(--timeline-border);
}

.tag-menu-header h2 {
  margin: 0 0 0.5rem;
  font-size: 0.875rem;
  font-weight: 600;
}

.tag-menu-header input {
  width: 100%;
  box-sizing: border-box;
  padding: 0.25rem 0.5rem;
  font-size: 0.75rem;
  color: var(--timeline-text);
  background: var(--timeline-surface);
  border: 1px solid var(--timeline-border-strong);
  border-radius: 0.25rem;
}

.tag-menu-header input:focus {
  outline: none;
  border-color: var(--timeline-accent);
}

.tag-tree {
  flex: 1;
  padding: 0.5rem;
  overflow-y: auto;
}

.tag-button {
  display: block;
  width: calc(100% - 0.5rem);
  margin: 0.125rem 0;
  padding: 0.25rem 0.5rem;
  font-size: 0.75rem;
  text-align: left;
  color: #e5e5e5;
  background: rgba(38, 38, 38, 0.5);
  border: none;
  border-radius: 0.25rem;
  cursor: pointer;
}

.tag-button:hover {
  background: rgba(64, 64, 64, 0.5);
}

.tag-button.is-active {
  color: #ffffff;
  background: rgba(2, 132, 199, 0.8);
}

.tag-button.is-active:hover {
  background: rgba(3, 105, 161, 0.8);
}

.grid-scroll {
  position: relative;
  flex: 1;
  min-width: 0;
  overflow-y: auto;
}

.timeline-grid {
  position: relative;
}

.grid-header {
  position: sticky;
  top: 0;
  z-index: 30;
  display: flex;
  background: var(--timeline-panel);
  border-bottom: 1px solid var(--timeline-border);
}

.axis-heading {
  width: var(--timeline-axis-width);
  flex-shrink: 0;
  padding: 0.5rem;
  font-size: 0.75rem;
  color: var(--timeline-muted);
}

.grid-columns {
  display: grid;
  flex: 1;
  grid-template-columns: 1fr;
}

.grid-columns.is-multi {
  grid-template-columns: repeat(4, 1fr);
}

.column-heading {
  padding: 0.5rem;
  font-size: 0.875rem;
  font-weight: 600;
  text-align: center;
}

.grid-body {
  position: relative;
  display: flex;
}

.year-axis {
  width: var(--timeline-axis-width);
  flex-shrink: 0;
  background: var(--timeline-bg);
  z-index: 20;
}

.year-tick {
  display: flex;
  align-items: center;
  justify-content: flex-end;
  gap: 0.25rem;
  padding-right: 0.5rem;
  box-sizing: border-box;
  font-size: 0.625rem;
  color: var(--timeline-faint);
}

.year-tick.major {
  font-size: 0.75rem;
  font-weight: 600;
  color: var(--timeline-text);
  border-top: 1px solid var(--timeline-border-strong);
}

.year-tick.medium {
  color: var(--timeline-muted);
  border-top: 1px solid var(--timeline-border);
}

.year-era {
  font-size: 0.625rem;
  color: var(--timeline-faint);
}

.grid-tracks {
  position: relative;
}

.region-track {
  position: relative;
  height: 100%;
  border-left: 1px solid var(--timeline-border);
}

.timeline-event {
  position: absolute;
  box-sizing: border-box;
  padding: 0 0.25rem;
  overflow: visible;
  border-radius: 0.25rem;
  cursor: default;
  transition: background 0.15s ease;
}

.timeline-event .event-label {
  overflow: hidden;
  font-size: 0.75rem;
  white-space: nowrap;
  text-overflow: ellipsis;
}

.timeline-event.is-important .event-label {
  font-weight: 700;
}

.timeline-event.conflict { background: var(--timeline-tone-conflict); color: #fef2f2; }
.timeline-event.conflict:hover { background: var(--timeline-tone-conflict-hover); }
.timeline-event.economic { background: var(--timeline-tone-economic); color: #ecfdf5; }
.timeline-event.economic:hover { background: var(--timeline-tone-economic-hover); }
.timeline-event.cultural { background: var(--timeline-tone-cultural); color: #eff6ff; }
.timeline-event.cultural:hover { background: var(--timeline-tone-cultural-hover); }
.timeline-event.political { background: var(--timeline-tone-political); color: #f0f9ff; }
.timeline-event.political:hover { background: var(--timeline-tone-political-hover); }

.event-detail {
  position: fixed;
  z-index: 50;
  max-width: 20rem;
  padding: 0.75rem;
  color: var(--timeline-text);
  background: var(--timeline-surface);
  border: 1px solid var(--timeline-border-strong);
  border-radius: 0.5rem;
  box-shadow: 0 20px 25px -5px rgba(0, 0, 0, 0.5);
  pointer-events: none;
}

.event-detail-name {
  font-weight: 600;
}

.event-detail-years {
  margin-top: 0.125rem;
  font-size: 0.75rem;
  color: var(--timeline-muted);
}

.event-detail-description {
  margin: 0.5rem 0;
  font-size: 0.875rem;
}

.event-detail-tags {
  display: flex;
  flex-wrap: wrap;
  gap: 0.25rem;
}

.event-tag {
  padding: 0.125rem 0.375rem;
  font-size: 0.75rem;
  color: #e5e5e5;
  background: var(--timeline-surface-hover);
  border-radius: 9999px;
}

.minimap-column {
  display: flex;
  flex-direction: column;
  border-left: 1px solid var(--timeline-border);
}

.minimap-controls {
  display: flex;
  gap: 0.5rem;
  padding: 0.5rem;
  background: var(--timeline-bg);
  border-bottom: 1px solid var(--timeline-border);
}

.minimap-controls button {
  padding: 0.5rem;
  color: var(--timeline-text);
  background: var(--timeline-surface);
  border: none;
  border-radius: 9999px;
  cursor: pointer;
}

.minimap-controls button:hover {
  background: var(--timeline-surface-hover);
}

.timeline-minimap {
  flex: 1;
  min-height: 0;
  background: rgba(23, 23, 23, 0.8);
}

.minimap-scroll {
  height: 100%;
  overflow: hidden;
}

.minimap-columns {
  position: relative;
  display: grid;
  grid-template-columns: 1fr;
}

.minimap-columns.is-multi {
  grid-template-columns: repeat(4, 1fr);
}

.minimap-track {
  position: relative;
}

.minimap-bar {
  position: absolute;
  left: 1px;
  right: 1px;
}

.minimap-bar.conflict { background: var(--timeline-tone-conflict); }
.minimap-bar.economic { background: var(--timeline-tone-economic); }
.minimap-bar.cultural { background: var(--timeline-tone-cultural); }
.minimap-bar.political { background: var(--timeline-tone-political); }

.minimap-viewport {
  position: absolute;
  left: 0;
  right: 0;
  background: rgba(255, 255, 255, 0.08);
  border: 1px solid rgba(255, 255, 255, 0.3);
  pointer-events: none;
}

.region-page {
  flex: 1;
  min-height: 0;
  overflow-y: auto;
}

.region-page h1 {
  margin: 0;
  padding: 1rem;
  font-size: 1.5rem;
  font-weight: 700;
}

.region-empty {
  padding: 0 1rem;
  color: var(--timeline-muted);
}

@media (max-width: 768px) {
  .tag-column {
    width: 9rem;
  }

  .nav-links {
    gap: 1rem;
  }

  .minimap-column {
    display: none;
  }
}
"#;

pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document không có thẻ <head>"))?;

    let style_el = document.create_element("style")?;
    style_el.set_attribute("data-timeline-ui", "v1")?;
    style_el.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&style_el.clone().dyn_into::<Node>()?)?;

    Ok(())
}
