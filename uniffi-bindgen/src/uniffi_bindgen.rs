//! Generates the Swift and Kotlin bindings for the `smartid` library.

fn main() {
    uniffi::uniffi_bindgen_main();
}
