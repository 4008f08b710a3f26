fn main() {
    // ESP-IDF link-time environment only matters for device builds; host
    // builds (lib + tests) carry no embuild dependency at all.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
