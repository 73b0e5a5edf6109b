fn main() {
    // Only the device build needs the ESP-IDF environment; host test builds
    // compile without the `espidf` feature.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
