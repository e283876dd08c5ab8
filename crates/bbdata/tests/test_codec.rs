//! End-to-end encode/decode tests over whole trees.

use bbdata::encode::to_bytes_with_config;
use bbdata::{
    CodecConfig, DataList, DataMap, DataValue, DataView, Decoder, Encoder, Error, Node, decode,
    encode,
};
use serde::Serialize;

fn round_trip(value: &DataValue) -> DataValue {
    let bytes = encode::to_bytes(value).expect("encode failed");
    decode::decode_slice(&bytes).expect("decode failed")
}

#[test]
fn test_scenario_b_round_trip() {
    let mut map = DataMap::new();
    map.set("fluffy", true).unwrap();
    map.set("prickly", false).unwrap();
    map.set("toasters", 22222i32).unwrap();
    map.create_map("color")
        .unwrap()
        .set("red", 0x35i16)
        .unwrap()
        .set("green", 0x80i16)
        .unwrap()
        .set("blue", 0xEAi16)
        .unwrap();
    map.create_list("shopping_list")
        .unwrap()
        .add("marshmellows")
        .add("pineapple")
        .add("pine-apple (apples that grow on pine trees)");

    let value = DataValue::of(map);
    let back = round_trip(&value);
    assert_eq!(back, value);

    let map = back.get_map().unwrap();
    assert_eq!(
        map.keys(),
        vec!["fluffy", "prickly", "toasters", "color", "shopping_list"]
    );
    assert_eq!(map.get_bool("fluffy"), Some(true));
    assert_eq!(map.get_bool("prickly"), Some(false));
    assert_eq!(map.get_int("toasters"), Some(22222));
    assert_eq!(map.get_short_at("color.green"), Some(0x80));
    assert_eq!(map.get_int_at("color.blue"), Some(0xEA));
    assert_eq!(
        map.get_string_at("shopping_list.2").as_deref(),
        Some("pine-apple (apples that grow on pine trees)")
    );
}

#[derive(Serialize)]
struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

#[derive(Serialize)]
struct Inventory {
    fluffy: bool,
    toasters: i32,
    color: Color,
    shopping_list: Vec<&'static str>,
}

#[test]
fn test_serde_tree_round_trip() {
    let inventory = Inventory {
        fluffy: true,
        toasters: 22222,
        color: Color {
            red: 0x35,
            green: 0x80,
            blue: 0xEA,
        },
        shopping_list: vec!["marshmellows", "pineapple"],
    };

    let mut value = DataValue::new();
    value.set_data(&inventory).unwrap();
    let back = round_trip(&value);

    let map = back.get_map().unwrap();
    // u8 widens to short
    assert_eq!(map.get_at("color.green").as_deref(), Some(&Node::Short(0x80)));
    assert_eq!(map.get_long("toasters"), Some(22222));
    // a list of strings shares the `U` tag and stays a list
    assert_eq!(map.get_list("shopping_list").unwrap().len(), 2);
}

#[test]
fn test_homogeneous_lists_are_shorter() {
    for n in 1..=20 {
        let list: DataList = (0..n).map(|_| Node::Int(-7)).collect();
        let value = DataValue::of(list);

        let typed = encode::to_bytes(&value).unwrap();
        let counted =
            to_bytes_with_config(&value, CodecConfig::new().with_homogeneous(false)).unwrap();
        assert_eq!(typed[1], b'$');
        assert_eq!(counted[1], b'#');
        if n >= 2 {
            assert!(typed.len() < counted.len(), "n={n}");
        }

        let back = decode::decode_slice(&typed).unwrap();
        assert_eq!(back.get(), Some(&Node::IntArray(vec![-7; n])));

        // the counted form decodes to an equal list
        let back = decode::decode_slice(&counted).unwrap();
        assert_eq!(back.get_int_array(), Some(vec![-7; n]));
    }
}

#[test]
fn test_auto_vivified_tree_round_trip() {
    let mut root = DataMap::new();
    root.set_at("a.b.c", "v").unwrap();
    assert!(root.get_map("a").is_some());
    assert!(root.get_map_at("a.b").is_some());
    assert_eq!(root.get_string_at("a.b.c").as_deref(), Some("v"));
    assert!(root.get_at("a.x.c").is_none());

    let back = round_trip(&DataValue::of(root));
    assert_eq!(
        back.get_map().unwrap().get_string_at("a.b.c").as_deref(),
        Some("v")
    );
}

#[test]
fn test_unknown_tag_aborts() {
    // valid map header, then a bogus value tag
    let bytes = b"{#B\x02B\x01aTB\x01bZ";
    assert!(matches!(
        decode::decode_slice(bytes),
        Err(Error::UnknownTag(b'Z'))
    ));
}

#[test]
fn test_stream_of_values() {
    let mut encoder = Encoder::new(Vec::new());
    encoder.encode(&DataValue::of(1i8)).unwrap();
    encoder.encode(&DataValue::new()).unwrap();
    encoder.encode(&DataValue::of("end")).unwrap();
    let bytes = encoder.into_inner();

    let mut decoder = Decoder::new(&bytes[..]);
    assert_eq!(decoder.decode().unwrap().get_byte(), Some(1));
    assert!(!decoder.decode().unwrap().is_present());
    assert_eq!(decoder.decode().unwrap().get_string().as_deref(), Some("end"));
    assert!(matches!(decoder.decode(), Err(Error::UnexpectedEof)));
}

#[test]
fn test_deep_nesting_is_bounded() {
    let mut bytes = Vec::new();
    for _ in 0..600 {
        bytes.extend_from_slice(b"[#B\x01");
    }
    bytes.extend_from_slice(b"[#B\x00");

    assert!(matches!(
        decode::decode_slice(&bytes),
        Err(Error::DepthLimitExceeded(512))
    ));

    let config = CodecConfig::new().with_max_depth(1000);
    assert!(decode::decode_with_config(&bytes[..], config).is_ok());
}
