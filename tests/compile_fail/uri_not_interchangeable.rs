// ABOUTME: Compile-fail test verifying ComponentUri and ConfigurationUri are not interchangeable.
// ABOUTME: This test should fail to compile, validating type safety.

use dngcm::types::{ComponentUri, ConfigurationUri};

fn takes_configuration(_uri: ConfigurationUri) {}

fn main() {
    let component = ComponentUri::new("https://clm.example.com/rm/cm/component/_c");
    takes_configuration(component); // ERROR: expected ConfigurationUri, found ComponentUri
}
