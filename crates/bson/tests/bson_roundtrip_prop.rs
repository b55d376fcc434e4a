use bson_serialization::{
    BsonBinary, BsonDbPointer, BsonDecimal128, BsonDecoder, BsonDocument, BsonEncoder,
    BsonJavascriptWithScope, BsonObjectId, BsonRegex, BsonTimestamp, BsonValue,
};
use proptest::prelude::*;
use std::io::Cursor;

fn arb_key() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]{0,11}"
}

fn arb_binary_subtype() -> impl Strategy<Value = u8> {
    prop_oneof![
        Just(0x00u8),
        Just(0x01u8),
        Just(0x02u8),
        Just(0x03u8),
        Just(0x04u8),
        Just(0x05u8),
        0x80u8..=0xFFu8,
    ]
}

fn arb_regex() -> impl Strategy<Value = BsonRegex> {
    (
        prop::sample::select(vec!["^a", "[0-9]+", "foo|bar", "x.*y", "\\w+@\\w+"]),
        prop::sample::select(vec!["", "i", "im", "imsx", "ilmsux"]),
    )
        .prop_map(|(pattern, options)| BsonRegex::new(pattern, options))
}

fn arb_leaf() -> impl Strategy<Value = BsonValue> {
    let scalar = prop_oneof![
        Just(BsonValue::Null),
        Just(BsonValue::MinKey),
        Just(BsonValue::MaxKey),
        any::<bool>().prop_map(BsonValue::Boolean),
        any::<i32>().prop_map(BsonValue::Int32),
        any::<i64>().prop_map(BsonValue::Int64),
        any::<i64>().prop_map(BsonValue::UtcDatetime),
        (-1.0e12f64..1.0e12).prop_map(BsonValue::Double),
        "[ -~]{0,16}".prop_map(BsonValue::String),
    ];
    let special = prop_oneof![
        any::<[u8; 12]>().prop_map(|b| BsonValue::ObjectId(BsonObjectId(b))),
        any::<[u8; 16]>().prop_map(|b| BsonValue::Decimal128(BsonDecimal128(b))),
        (any::<[u8; 4]>(), any::<[u8; 4]>()).prop_map(|(increment, timestamp)| {
            BsonValue::Timestamp(BsonTimestamp {
                increment,
                timestamp,
            })
        }),
        (arb_binary_subtype(), prop::collection::vec(any::<u8>(), 0..24)).prop_map(
            |(subtype, data)| BsonValue::Binary(BsonBinary { subtype, data })
        ),
        arb_regex().prop_map(BsonValue::Regex),
        ("[a-z]{1,8}\\.[a-z]{1,8}", any::<[u8; 12]>()).prop_map(|(namespace, id)| {
            BsonValue::DbPointer(BsonDbPointer {
                namespace,
                id: BsonObjectId(id),
            })
        }),
    ];
    prop_oneof![scalar, special]
}

fn arb_document_with(
    value: BoxedStrategy<BsonValue>,
) -> impl Strategy<Value = BsonDocument> {
    prop::collection::vec((arb_key(), value), 0..5)
        .prop_map(|pairs| pairs.into_iter().collect())
}

fn arb_value() -> impl Strategy<Value = BsonValue> {
    arb_leaf().prop_recursive(3, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(BsonValue::Array),
            arb_document_with(inner.clone()).prop_map(BsonValue::Document),
            (arb_key(), arb_document_with(inner)).prop_map(|(code, scope)| {
                BsonValue::JavascriptWithScope(BsonJavascriptWithScope { code, scope })
            }),
        ]
    })
}

fn arb_document() -> impl Strategy<Value = BsonDocument> {
    arb_document_with(arb_value().boxed())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_document_roundtrip(doc in arb_document()) {
        let encoded = BsonEncoder::new().encode(&doc).unwrap();
        let decoded = BsonDecoder::new().decode(&encoded).unwrap();
        prop_assert_eq!(decoded, doc);
    }

    #[test]
    fn prop_declared_length_matches_buffer(doc in arb_document()) {
        let encoded = BsonEncoder::new().encode(&doc).unwrap();
        let declared = i32::from_le_bytes([encoded[0], encoded[1], encoded[2], encoded[3]]);
        prop_assert_eq!(declared as usize, encoded.len());
        prop_assert_eq!(*encoded.last().unwrap(), 0x00);
    }

    #[test]
    fn prop_stream_decode_matches_buffer_decode(doc in arb_document()) {
        let encoded = BsonEncoder::new().encode(&doc).unwrap();
        let decoder = BsonDecoder::new();
        let from_buffer = decoder.decode(&encoded).unwrap();
        let from_stream = decoder.decode_stream(Cursor::new(encoded)).unwrap();
        prop_assert_eq!(from_buffer, from_stream);
    }

    #[test]
    fn prop_corrupt_declared_length_never_decodes(doc in arb_document(), delta in prop_oneof![Just(-1i32), Just(1i32), Just(7i32)]) {
        let mut encoded = BsonEncoder::new().encode(&doc).unwrap();
        let declared = i32::from_le_bytes([encoded[0], encoded[1], encoded[2], encoded[3]]);
        encoded[0..4].copy_from_slice(&(declared + delta).to_le_bytes());
        prop_assert!(BsonDecoder::new().decode(&encoded).is_err());
    }
}
