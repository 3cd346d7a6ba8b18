fn main() {
    // Only the bridge commands are known to the ACL; pages get nothing else.
    tauri_build::try_build(tauri_build::Attributes::new().app_manifest(
        tauri_build::AppManifest::new().commands(&[
            "desktop_bridge_get_server_url",
            "desktop_bridge_go_back",
            "desktop_bridge_can_go_back",
        ]),
    ))
    .expect("failed to run tauri build script");
}
