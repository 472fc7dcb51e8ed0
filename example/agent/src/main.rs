use hook_sync::*;

/// Start a hook agent serving the hook tree of this server
fn main() {
    let rt = tokio::runtime::Runtime::new().expect("Runtime expected to start but failed");
    match HookAgent::new().start(rt) {
        Ok(_) => println!("Successfully exit"),
        Err(err) => eprintln!("Agent crash with error: {}", err),
    }
}
