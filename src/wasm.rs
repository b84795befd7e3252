//! WebAssembly support glue. A panic in a wasm build normally just traps;
//! forwarding the panic message to the browser console keeps web crashes
//! diagnosable.

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}
