use crate::{
    ExportConfig, Gzip, HEADER_SIZE, SpzCloud, SpzError, SpzHeader, StreamCompressor,
    codec::{decode, decode_compressed, encode, encode_compressed, load_spz, save_spz},
    quant::quantize_sh_band1,
    splat::SplatPoint,
};
use assert_approx_eq::assert_approx_eq;
use glam::{Quat, Vec3};

fn point(position: Vec3, scale: Vec3, rotation: [u8; 4], color: [u8; 3], alpha: u8) -> SplatPoint {
    SplatPoint {
        position,
        scale,
        rotation,
        color,
        alpha,
        ..Default::default()
    }
}

fn sh2(base: u8) -> [u8; 24] {
    std::array::from_fn(|i| base + i as u8 * 6)
}

fn sh3(base: u8) -> [u8; 21] {
    std::array::from_fn(|i| base + i as u8 * 8)
}

fn three_point_cloud() -> SpzCloud {
    let mut points = vec![
        point(
            Vec3::new(1.5, 2.5, 3.5),
            Vec3::new(0.1, 0.2, 0.3),
            [128, 138, 148, 158],
            [255, 128, 64],
            200,
        ),
        point(
            Vec3::new(-1.5, -2.5, -3.5),
            Vec3::new(0.4, 0.5, 0.6),
            [130, 140, 150, 160],
            [64, 128, 255],
            180,
        ),
        point(
            Vec3::new(0.0, 1.0, -1.0),
            Vec3::new(0.7, 0.8, 0.9),
            [135, 145, 155, 165],
            [128, 255, 128],
            220,
        ),
    ];
    points[0].sh1 = Some([100, 110, 120, 130, 140, 150, 160, 170, 180]);
    points[1].sh1 = Some([90, 100, 110, 120, 130, 140, 150, 160, 170]);
    points[2].sh1 = Some([80, 90, 100, 110, 120, 130, 140, 150, 160]);
    SpzCloud::new(2, 1, points)
}

#[test]
fn roundtrip_v2_degree1() {
    let cloud = three_point_cloud();
    let bytes = encode_compressed(&cloud, &Gzip::default()).expect("Failed to encode");
    let decoded = decode_compressed(&bytes, &Gzip::default()).expect("Failed to decode");

    assert_eq!(decoded.header, cloud.header);
    assert_eq!(decoded.points.len(), 3);

    for (orig, read) in cloud.points.iter().zip(&decoded.points) {
        for axis in 0..3 {
            assert_approx_eq!(orig.position[axis], read.position[axis], 0.001);
            assert_approx_eq!(orig.scale[axis], read.scale[axis], 0.1);
        }
        assert_eq!(orig.alpha, read.alpha);
        assert!(read.rotation.iter().all(|&c| c != 0), "{:?}", read.rotation);
        assert_eq!(read.sh1.map(|s| s.len()), Some(9));
        assert!(read.sh2.is_none() && read.sh3.is_none(), "degree 1 only has sh1");
    }

    // Stored SH bytes are the band 1 quantized input.
    assert_eq!(
        decoded.points[0].sh1,
        Some([104, 112, 120, 128, 144, 152, 160, 168, 184])
    );
}

#[test]
fn roundtrip_v3_degree2() {
    let mut points = vec![
        point(
            Vec3::new(10.5, 20.5, 30.5),
            Vec3::new(1.1, 1.2, 1.3),
            [128, 138, 148, 158],
            [255, 200, 100],
            250,
        ),
        point(
            Vec3::new(-5.5, -10.5, -15.5),
            Vec3::new(2.1, 2.2, 2.3),
            [130, 140, 150, 160],
            [100, 200, 255],
            230,
        ),
    ];
    points[0].sh2 = Some(sh2(90));
    points[1].sh2 = Some(sh2(70));
    let cloud = SpzCloud::new(3, 2, points);

    let decoded = decode(&encode(&cloud).unwrap()).unwrap();
    assert_eq!(decoded.header.version, 3);
    assert_eq!(decoded.header.sh_degree, 2);
    assert_eq!(decoded.points.len(), 2);
    for (orig, read) in cloud.points.iter().zip(&decoded.points) {
        assert_eq!(read.sh2.map(|s| s.len()), Some(24));
        let dot = orig
            .rotation_quat()
            .normalize()
            .dot(read.rotation_quat().normalize());
        assert!(dot.abs() > 0.999, "rotation drifted: {dot}");
    }
}

#[test]
fn roundtrip_degree3() {
    let mut p = point(
        Vec3::new(5.0, 6.0, 7.0),
        Vec3::new(0.5, 0.6, 0.7),
        [128, 138, 148, 158],
        [128, 128, 128],
        255,
    );
    p.sh2 = Some(sh2(100));
    p.sh3 = Some(sh3(80));
    let cloud = SpzCloud::new(3, 3, vec![p]);

    let bytes = encode_compressed(&cloud, &Gzip::new(1)).unwrap();
    let decoded = decode_compressed(&bytes, &Gzip::default()).unwrap();
    assert_eq!(decoded.header.sh_degree, 3);
    let read = &decoded.points[0];
    assert_eq!(read.sh2.map(|s| s.len()), Some(24));
    assert_eq!(read.sh3.map(|s| s.len()), Some(21));
    assert_eq!(read.color, [128, 128, 128]);
}

#[test]
fn empty_cloud() {
    let cloud = SpzCloud::new(2, 0, vec![]);
    let bytes = encode(&cloud).unwrap();
    assert_eq!(bytes.len(), HEADER_SIZE);

    let bytes = encode_compressed(&cloud, &Gzip::default()).unwrap();
    let decoded = decode_compressed(&bytes, &Gzip::default()).unwrap();
    assert_eq!(decoded.header.num_points, 0);
    assert!(decoded.points.is_empty(), "no points expected");
}

#[test]
fn uncompressed_input_falls_back() {
    let cloud = three_point_cloud();
    let raw = encode(&cloud).unwrap();
    let decoded = decode_compressed(&raw, &Gzip::default()).unwrap();
    assert_eq!(decoded, decode(&raw).unwrap());
}

#[test]
fn multi_member_gzip_decodes() {
    let cloud = three_point_cloud();
    let raw = encode(&cloud).unwrap();
    let gzip = Gzip::default();
    let (head, tail) = raw.split_at(HEADER_SIZE + 5);
    let mut joined = gzip.compress(head).unwrap();
    joined.extend(gzip.compress(tail).unwrap());
    assert_eq!(decode_compressed(&joined, &gzip).unwrap(), decode(&raw).unwrap());
}

#[test]
fn corrupt_section_is_rejected() {
    let mut raw = encode(&three_point_cloud()).unwrap();
    raw.pop();
    assert!(matches!(decode(&raw), Err(SpzError::DataSizeMismatch { .. })));

    // Point count says 4, data holds 3.
    let mut raw = encode(&three_point_cloud()).unwrap();
    raw[8] = 4;
    assert!(matches!(
        decode_compressed(&raw, &Gzip::default()),
        Err(SpzError::DataSizeMismatch { .. })
    ));

    // A lone header may not claim points.
    let header = SpzHeader::new(3, 1, 0);
    assert!(matches!(
        decode(&header.to_bytes()),
        Err(SpzError::DataSizeMismatch {
            expected: 20,
            actual: 0
        })
    ));
}

#[test]
fn garbage_is_rejected() {
    assert!(matches!(
        decode_compressed(b"NGSP", &Gzip::default()),
        Err(SpzError::InsufficientHeaderData { len: 4 })
    ));
    let compressed = Gzip::default().compress(&[7; 64]).unwrap();
    assert!(matches!(
        decode_compressed(&compressed, &Gzip::default()),
        Err(SpzError::MagicMismatch { .. })
    ));
}

#[test]
fn encode_rejects_invalid_header() {
    let mut cloud = three_point_cloud();
    cloud.header.version = 1;
    assert!(matches!(encode(&cloud), Err(SpzError::UnsupportedVersion(1))));

    let mut cloud = three_point_cloud();
    cloud.points.pop();
    assert!(matches!(
        encode(&cloud),
        Err(SpzError::PointCountMismatch {
            header: 3,
            points: 2
        })
    ));
}

#[test]
fn huge_point_count_is_rejected_before_allocating() {
    let mut cloud = SpzCloud::new(3, 3, vec![]);
    cloud.header.num_points = u32::MAX;
    assert!(matches!(
        encode(&cloud),
        Err(SpzError::PointCountMismatch {
            header: u32::MAX,
            points: 0
        })
    ));
    assert!(matches!(
        encode_compressed(&cloud, &Gzip::default()),
        Err(SpzError::PointCountMismatch { .. })
    ));
}

#[test]
fn retarget_version_and_degree() {
    let mut cloud = three_point_cloud();
    cloud.points[0].set_rotation_quat(Quat::from_rotation_y(1.0));

    let config = ExportConfig {
        sh_degree: Some(3),
        ..Default::default()
    };
    let decoded = decode(&encode(&config.apply(&cloud)).unwrap()).unwrap();
    assert_eq!(decoded.header.version, 3);

    let read = &decoded.points[0];
    // Band 1 kept from sh1, the rest are placeholders.
    let band1 = cloud.points[0].sh1.map(|s| s.map(quantize_sh_band1).to_vec());
    assert_eq!(read.sh2.map(|s| s[..9].to_vec()), band1);
    assert_eq!(read.sh2.map(|s| s[9..].to_vec()), Some(vec![128; 15]));
    assert_eq!(read.sh3, Some([128; 21]));

    let angle = read
        .rotation_quat()
        .normalize()
        .angle_between(Quat::from_rotation_y(1.0));
    assert!(angle < 0.05, "rotation drifted by {angle}");
}

#[tokio::test]
async fn load_and_save() {
    let cloud = three_point_cloud();

    let mut compressed = vec![];
    save_spz(&mut compressed, &cloud, Some(&Gzip::default()))
        .await
        .unwrap();
    let mut raw = vec![];
    save_spz(&mut raw, &cloud, None).await.unwrap();

    assert_eq!(compressed[..2], [0x1f, 0x8b]);
    assert_eq!(raw, encode(&cloud).unwrap());

    let from_compressed = load_spz(compressed.as_slice()).await.unwrap();
    let from_raw = load_spz(raw.as_slice()).await.unwrap();
    assert_eq!(from_compressed, from_raw);
    assert_eq!(from_raw.points.len(), 3);
}
