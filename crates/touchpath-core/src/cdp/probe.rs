//! Scripts evaluated in the page.
//!
//! Every script first descends through the target's iframe selectors to the
//! element's document, then does its work there. Selectors are embedded as
//! JSON string literals, so any quoting in them is preserved.

use crate::layout::ElementTarget;

/// Id of the overlay `<svg>` that shows the finger trail.
pub const OVERLAY_ID: &str = "__touchpath_trail";

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn js_string_array(values: &[String]) -> String {
    serde_json::Value::from(values.to_vec()).to_string()
}

/// Shared prologue: binds `doc` to the element's document or returns `null`.
fn resolve_document(target: &ElementTarget) -> String {
    format!(
        r#"let doc = document;
  for (const sel of {frames}) {{
    const host = doc.querySelector(sel);
    if (!host || !host.contentDocument) return null;
    doc = host.contentDocument;
  }}"#,
        frames = js_string_array(&target.frames),
    )
}

/// Script returning a layout snapshot of the target, or `null` when the
/// element (or one of its frames) is missing.
///
/// Contexts are numbered from the outermost window (`"0"`) inwards. A
/// context whose hosting frame cannot be read reports `frame: null`; its
/// parent still lists the frames it embeds, which lets the resolver find
/// the host by content identity.
pub fn layout_probe(target: &ElementTarget) -> String {
    format!(
        r#"(() => {{
  {resolve}
  const el = doc.querySelector({selector});
  if (!el) return null;
  const chain = [];
  for (let w = doc.defaultView; w; w = w.parent) {{
    chain.push(w);
    if (w === w.parent) break;
  }}
  const idOf = (win) => {{
    const i = chain.indexOf(win);
    return i < 0 ? null : String(chain.length - 1 - i);
  }};
  const rect = (b) => ({{ x: b.left, y: b.top, width: b.width, height: b.height }});
  const box = (f) => ({{ rect: rect(f.getBoundingClientRect()), layoutWidth: f.offsetWidth }});
  const contexts = chain.map((win, i) => {{
    let frame = null;
    let embedded = [];
    try {{ if (win.frameElement) frame = box(win.frameElement); }} catch (e) {{}}
    try {{
      embedded = Array.from(win.document.querySelectorAll('iframe, frame'))
        .map((f) => ({{ content: idOf(f.contentWindow), frame: box(f) }}))
        .filter((e) => e.content !== null);
    }} catch (e) {{}}
    return {{ id: idOf(win), parent: i + 1 < chain.length ? idOf(chain[i + 1]) : null, frame, embedded }};
  }});
  let root = null;
  try {{
    const top = chain[chain.length - 1];
    if (top.document && top.document.documentElement) root = idOf(top);
  }} catch (e) {{}}
  return {{ context: idOf(chain[0]), element: rect(el.getBoundingClientRect()), contexts, root }};
}})()"#,
        resolve = resolve_document(target),
        selector = js_string(&target.selector),
    )
}

/// Script adding to the trail overlay in the target's document, creating
/// the overlay on first use.
///
/// `markup` is appended as new elements. Each `(finger, d)` extension is
/// appended to the path data of that finger's latest line. Returns `true`
/// when drawn.
pub fn append_overlay(target: &ElementTarget, markup: &str, extensions: &[(usize, String)]) -> String {
    format!(
        r#"(() => {{
  {resolve}
  let svg = doc.getElementById({id});
  if (!svg) {{
    svg = doc.createElementNS('http://www.w3.org/2000/svg', 'svg');
    svg.id = {id};
    svg.setAttribute('style', 'position:fixed;top:0;left:0;width:100vw;height:100vh;z-index:99999999;pointer-events:none');
    (doc.body || doc.documentElement).appendChild(svg);
  }}
  const markup = {markup};
  if (markup) svg.insertAdjacentHTML('beforeend', markup);
  for (const [finger, d] of {extensions}) {{
    const lines = svg.querySelectorAll('path.line-' + finger);
    const line = lines[lines.length - 1];
    if (line) line.setAttribute('d', line.getAttribute('d') + d);
  }}
  return true;
}})()"#,
        resolve = resolve_document(target),
        id = js_string(OVERLAY_ID),
        markup = js_string(markup),
        extensions = serde_json::Value::from(
            extensions
                .iter()
                .map(|(finger, d)| serde_json::json!([finger, d]))
                .collect::<Vec<_>>()
        ),
    )
}

/// Script removing the trail overlay from the target's document.
pub fn remove_overlay(target: &ElementTarget) -> String {
    format!(
        r#"(() => {{
  {resolve}
  const svg = doc.getElementById({id});
  if (svg) svg.remove();
  return true;
}})()"#,
        resolve = resolve_document(target),
        id = js_string(OVERLAY_ID),
    )
}
