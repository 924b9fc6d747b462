/// Build script for meshview
///
/// The WGSL shader is embedded with `include_str!`, so edits to it must
/// trigger a rebuild.
fn main() {
    println!("cargo:rerun-if-changed=src/renderer/shaders/shader.wgsl");
}
