fn main() {
    // Propagate the ESP-IDF link environment only when building for the
    // pinned-task target; host builds need nothing from the build script.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
