use pdf_codec_core::encryption::{EncryptionAlgorithm, EncryptionProfile, EncryptionState, Permissions};

const DOCUMENT_ID: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F,
];

#[test]
fn s4_rc4v1_deterministic_o_and_u_values() {
    let profile = EncryptionProfile::new(EncryptionAlgorithm::Rc4V1, 40, Permissions::empty());
    let a = EncryptionState::new(profile, &DOCUMENT_ID, b"", b"", true);
    let b = EncryptionState::new(profile, &DOCUMENT_ID, b"", b"", true);
    assert_eq!(a.owner_value(), b.owner_value());
    assert_eq!(a.user_value(), b.user_value());

    let mut a = a;
    a.set_current_reference((4, 0));
    let ciphertext = a.encrypt(b"PDF").unwrap();
    assert_eq!(ciphertext.len(), 3);
}

#[test]
fn s5_aesv2_iv_plus_one_block_round_trips() {
    let profile = EncryptionProfile::new(EncryptionAlgorithm::Aes128, 128, Permissions::empty());
    let mut state = EncryptionState::new(profile, &DOCUMENT_ID, b"", b"", true);
    state.set_current_reference((4, 0));

    let ciphertext = state.encrypt(b"PDF").unwrap();
    assert_eq!(ciphertext.len(), 32);
    assert_eq!(state.decrypt(&ciphertext).unwrap(), b"PDF".to_vec());
}

/// Universal property 3: encrypting then decrypting under the same object
/// reference round-trips, and a different reference changes the output.
#[test]
fn object_encryption_round_trips_and_is_reference_dependent() {
    for algorithm in [EncryptionAlgorithm::Rc4V2, EncryptionAlgorithm::Aes128] {
        let key_bits = if algorithm == EncryptionAlgorithm::Aes128 { 128 } else { 128 };
        let profile = EncryptionProfile::new(algorithm, key_bits, Permissions::empty());
        let mut state = EncryptionState::new(profile, &DOCUMENT_ID, b"owner", b"user", true);

        state.set_current_reference((7, 0));
        let first = state.encrypt(b"stream contents").unwrap();
        assert_eq!(state.decrypt(&first).unwrap(), b"stream contents".to_vec());

        state.set_current_reference((8, 0));
        let second = state.encrypt(b"stream contents").unwrap();
        assert_ne!(first, second, "{algorithm:?} ciphertext should depend on the object reference");
    }
}

/// Universal property 4: user and owner passwords both authenticate to the
/// same document encryption key.
#[test]
fn user_and_owner_authentication_install_the_same_key() {
    let profile = EncryptionProfile::new(EncryptionAlgorithm::Rc4V2, 128, Permissions::PRINT | Permissions::COPY);
    let state = EncryptionState::new(profile, &DOCUMENT_ID, b"owner-pw", b"user-pw", true);
    let dict = state.encryption_dictionary();

    let mut via_user = EncryptionState::from_dictionary(&dict, &DOCUMENT_ID, b"user-pw", true).unwrap();
    let mut via_owner = EncryptionState::from_dictionary(&dict, &DOCUMENT_ID, b"owner-pw", true).unwrap();

    via_user.set_current_reference((2, 0));
    via_owner.set_current_reference((2, 0));
    assert_eq!(via_user.encrypt(b"same key").unwrap(), via_owner.encrypt(b"same key").unwrap());
}

#[test]
fn wrong_password_does_not_authenticate() {
    let profile = EncryptionProfile::new(EncryptionAlgorithm::Rc4V2, 128, Permissions::empty());
    let state = EncryptionState::new(profile, &DOCUMENT_ID, b"owner-pw", b"user-pw", true);
    let dict = state.encryption_dictionary();

    assert!(EncryptionState::from_dictionary(&dict, &DOCUMENT_ID, b"incorrect", true).is_err());
}

/// Universal property 5: permission bits survive a round trip through the
/// encryption dictionary's `/P` entry.
#[test]
fn permission_bits_survive_the_encryption_dictionary() {
    let requested = Permissions::PRINT | Permissions::EDIT_NOTES | Permissions::DOC_ASSEMBLY;
    let profile = EncryptionProfile::new(EncryptionAlgorithm::Rc4V1, 40, requested);
    let state = EncryptionState::new(profile, &DOCUMENT_ID, b"", b"", true);

    let dict = state.encryption_dictionary();
    let stored = dict.get(b"P").and_then(pdf_codec_core::value::Value::as_i64).unwrap();
    assert_eq!(stored as i32, profile.permissions.bits());
    assert_eq!(profile.permissions, requested.corrected());
}
