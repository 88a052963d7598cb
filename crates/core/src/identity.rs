//! Identity provider seam: names, addresses, phone numbers and emails.
//!
//! The synthesis engine treats identity data as opaque strings. [`FakeIdentityProvider`]
//! draws them from the `fake` crate's English locale using the caller's random source,
//! so seeded runs stay reproducible. The locale has no gendered first names, so patient
//! given names come from the short lists below.

use fake::faker::address::en::{BuildingNumber, CityName, StateAbbr, StreetName, ZipCode};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use crate::record::Gender;
use crate::rng::pick_str;
use fake::Fake;
use rand::RngCore;
use serde::Serialize;
use std::fmt;

const MALE_GIVEN_NAMES: &[&str] = &[
    "James", "Robert", "John", "Michael", "William", "David", "Richard", "Joseph", "Thomas",
    "Charles", "Donald", "George", "Kenneth", "Edward", "Ronald", "Gary", "Larry", "Frank",
    "Raymond", "Walter", "Harold", "Eugene", "Carl", "Arthur", "Roger", "Gerald",
];

const FEMALE_GIVEN_NAMES: &[&str] = &[
    "Mary", "Patricia", "Linda", "Barbara", "Elizabeth", "Susan", "Margaret", "Dorothy",
    "Nancy", "Karen", "Betty", "Helen", "Sandra", "Carol", "Ruth", "Sharon", "Donna",
    "Shirley", "Judith", "Joyce", "Frances", "Evelyn", "Joan", "Gloria", "Beverly", "Janet",
];

/// A postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostalAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl PostalAddress {
    /// Single-line form with the street separated by a pipe, as used on letterheads.
    pub fn letterhead_line(&self) -> String {
        format!("{} | {}, {} {}", self.street, self.city, self.state, self.zip)
    }
}

impl fmt::Display for PostalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {} {}", self.street, self.city, self.state, self.zip)
    }
}

/// Source of personal identity data.
pub trait IdentityProvider {
    fn first_name(&self, rng: &mut dyn RngCore) -> String;
    /// A first or middle name conventionally given to `gender`.
    fn given_name(&self, rng: &mut dyn RngCore, gender: Gender) -> String;
    fn last_name(&self, rng: &mut dyn RngCore) -> String;
    fn address(&self, rng: &mut dyn RngCore) -> PostalAddress;
    fn phone(&self, rng: &mut dyn RngCore) -> String;
    fn email(&self, rng: &mut dyn RngCore) -> String;

    /// `First Last`.
    fn full_name(&self, rng: &mut dyn RngCore) -> String {
        let first = self.first_name(rng);
        let last = self.last_name(rng);
        format!("{first} {last}")
    }
}

/// Identity data from the `fake` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeIdentityProvider;

impl IdentityProvider for FakeIdentityProvider {
    fn first_name(&self, rng: &mut dyn RngCore) -> String {
        FirstName().fake_with_rng(rng)
    }

    fn given_name(&self, rng: &mut dyn RngCore, gender: Gender) -> String {
        match gender {
            Gender::Male => pick_str(rng, MALE_GIVEN_NAMES),
            Gender::Female => pick_str(rng, FEMALE_GIVEN_NAMES),
        }
    }

    fn last_name(&self, rng: &mut dyn RngCore) -> String {
        LastName().fake_with_rng(rng)
    }

    fn address(&self, rng: &mut dyn RngCore) -> PostalAddress {
        let number: String = BuildingNumber().fake_with_rng(rng);
        let street: String = StreetName().fake_with_rng(rng);
        PostalAddress {
            street: format!("{number} {street}"),
            city: CityName().fake_with_rng(rng),
            state: StateAbbr().fake_with_rng(rng),
            zip: ZipCode().fake_with_rng(rng),
        }
    }

    fn phone(&self, rng: &mut dyn RngCore) -> String {
        PhoneNumber().fake_with_rng(rng)
    }

    fn email(&self, rng: &mut dyn RngCore) -> String {
        SafeEmail().fake_with_rng(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::make_rng;

    #[test]
    fn test_fake_provider_produces_non_empty_values() {
        let provider = FakeIdentityProvider;
        let mut rng = make_rng(11, "identity");
        assert!(!provider.first_name(&mut rng).is_empty());
        assert!(!provider.last_name(&mut rng).is_empty());
        assert!(provider.full_name(&mut rng).contains(' '));
        assert!(provider.email(&mut rng).contains('@'));
        let address = provider.address(&mut rng);
        assert!(!address.city.is_empty());
        assert_eq!(address.state.len(), 2);
    }

    #[test]
    fn test_fake_provider_is_reproducible_with_seed() {
        let provider = FakeIdentityProvider;
        let a = provider.full_name(&mut make_rng(5, "same"));
        let b = provider.full_name(&mut make_rng(5, "same"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_given_names_follow_gender() {
        let provider = FakeIdentityProvider;
        let mut rng = make_rng(3, "given");
        for _ in 0..100 {
            let male = provider.given_name(&mut rng, Gender::Male);
            assert!(MALE_GIVEN_NAMES.contains(&male.as_str()));
            let female = provider.given_name(&mut rng, Gender::Female);
            assert!(FEMALE_GIVEN_NAMES.contains(&female.as_str()));
        }
    }

    #[test]
    fn test_given_name_lists_do_not_overlap() {
        assert!(MALE_GIVEN_NAMES
            .iter()
            .all(|name| !FEMALE_GIVEN_NAMES.contains(name)));
    }

    #[test]
    fn test_letterhead_line() {
        let address = PostalAddress {
            street: "12 Elm Street".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            zip: "62701".into(),
        };
        assert_eq!(address.letterhead_line(), "12 Elm Street | Springfield, IL 62701");
    }
}
