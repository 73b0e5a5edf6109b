//! Device identity derived from the ESP32 factory MAC address.
//!
//! Produces a stable device ID in the form `TC-XXYYZZ` (last 3 bytes of
//! the 6-byte MAC in uppercase hex), logged at boot. The full MAC is shown
//! on the address screen.

/// Fixed-size device ID string.
pub type DeviceIdString = heapless::String<16>;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(feature = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(feature = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0x90, 0xA2, 0xDA, 0x0F, 0x25, 0xC7]
}

/// Derive the short device ID from the last 3 MAC bytes.
pub fn device_id(mac: &MacAddress) -> DeviceIdString {
    let mut id = DeviceIdString::new();
    use core::fmt::Write;
    let _ = write!(id, "TC-{:02X}{:02X}{:02X}", mac[3], mac[4], mac[5]);
    id
}
