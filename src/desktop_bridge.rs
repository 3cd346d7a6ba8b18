//! Bridge between backend-served pages and the desktop shell.
//!
//! Pages from the backend origin get a `window.desktopBridge` object backed
//! by three IPC commands. Nothing else in the Tauri API is reachable from
//! displayed content.

use tauri::{ipc::CapabilityBuilder, AppHandle, Manager, Webview};
use url::Url;

use crate::{app_types::BackendEndpoint, BRIDGE_CAPABILITY_ID, MAIN_WINDOW_LABEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BridgeOperation {
    GetServerUrl,
    GoBack,
    CanGoBack,
}

impl BridgeOperation {
    pub(crate) const ALL: [Self; 3] = [Self::GetServerUrl, Self::GoBack, Self::CanGoBack];

    pub(crate) fn command(self) -> &'static str {
        match self {
            Self::GetServerUrl => "desktop_bridge_get_server_url",
            Self::GoBack => "desktop_bridge_go_back",
            Self::CanGoBack => "desktop_bridge_can_go_back",
        }
    }

    /// Method name on `window.desktopBridge`.
    pub(crate) fn script_method(self) -> &'static str {
        match self {
            Self::GetServerUrl => "getServerUrl",
            Self::GoBack => "goBack",
            Self::CanGoBack => "canGoBack",
        }
    }

    /// Permission generated for the command by the build script manifest.
    pub(crate) fn permission(self) -> String {
        format!("allow-{}", self.command().replace('_', "-"))
    }
}

/// Key under which the script stamps each history entry in `history.state`.
pub(crate) const HISTORY_ENTRY_KEY: &str = "__qpgEntry";

/// Builds the injected bridge. Every call carries the current history entry
/// key, and the script reports the key on its own after injection, on cache
/// restore and after same-document navigation, so the shell always knows
/// which entry is showing.
pub(crate) fn desktop_bridge_script() -> String {
    let methods = BridgeOperation::ALL
        .iter()
        .map(|operation| {
            format!(
                "      {}: function () {{ return invoke({:?}); }},",
                operation.script_method(),
                operation.command()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let report_command = BridgeOperation::CanGoBack.command();

    format!(
        r#"(function () {{
  if (window.desktopBridge && window.desktopBridge.__questionPaperDesktop) {{
    return;
  }}
  var internals = window.__TAURI_INTERNALS__;
  if (!internals || typeof internals.invoke !== "function") {{
    return;
  }}
  var history = window.history;
  var entryKey = function () {{
    var state = history.state;
    if (state && typeof state === "object" && typeof state.{HISTORY_ENTRY_KEY} === "string") {{
      return state.{HISTORY_ENTRY_KEY};
    }}
    var key = Date.now().toString(36) + "-" + Math.random().toString(36).slice(2);
    var next = Object.assign({{}}, state && typeof state === "object" ? state : {{}});
    next.{HISTORY_ENTRY_KEY} = key;
    try {{
      history.replaceState(next, "");
    }} catch (error) {{}}
    return key;
  }};
  var invoke = function (command) {{
    return internals.invoke(command, {{ entry: entryKey() }});
  }};
  var report = function () {{
    invoke({report_command:?}).catch(function () {{}});
  }};
  var pushState = history.pushState;
  history.pushState = function () {{
    var result = pushState.apply(history, arguments);
    report();
    return result;
  }};
  window.addEventListener("pageshow", function (event) {{
    if (event.persisted) {{
      report();
    }}
  }});
  window.addEventListener("popstate", report);
  window.addEventListener("hashchange", report);
  Object.defineProperty(window, "desktopBridge", {{
    configurable: true,
    value: Object.freeze({{
      __questionPaperDesktop: true,
{methods}
    }}),
  }});
  report();
}})();"#
    )
}

/// True when `page_url` is served from the backend origin.
pub(crate) fn should_inject_desktop_bridge(backend_url: &str, page_url: &Url) -> bool {
    let Ok(backend_url) = Url::parse(backend_url) else {
        return false;
    };
    backend_url.origin() == page_url.origin()
}

pub(crate) fn inject_desktop_bridge<F>(webview: &Webview, log: F)
where
    F: Fn(&str),
{
    if let Err(error) = webview.eval(&desktop_bridge_script()) {
        log(&format!("failed to inject desktop bridge script: {error}"));
    }
}

/// Grants the backend origin access to the bridge commands in the main
/// window, and nothing else.
pub(crate) fn register_bridge_capability(
    app_handle: &AppHandle,
    endpoint: &BackendEndpoint,
) -> Result<(), String> {
    let capability = BridgeOperation::ALL.iter().fold(
        CapabilityBuilder::new(BRIDGE_CAPABILITY_ID)
            .remote(endpoint.origin_pattern())
            .window(MAIN_WINDOW_LABEL),
        |builder, operation| builder.permission(operation.permission()),
    );

    app_handle
        .add_capability(capability)
        .map_err(|error| format!("Failed to register desktop bridge capability: {error}"))
}
