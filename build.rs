fn main() {
    println!("cargo:rerun-if-env-changed=SAFETY_DEVICE_ID");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
