// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image XObjects — DCT pass-through for JPEG, Flate RGB plus soft mask for
// everything else.

use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use tracing::{debug, warn};

use crate::assets::{ImageAsset, ImageData};

/// Add `image` to `document` as an image XObject and return its id.
pub fn add_image_xobject(document: &mut Document, image: &ImageAsset) -> ObjectId {
    let width = i64::from(image.width());
    let height = i64::from(image.height());

    match image.data() {
        ImageData::Jpeg { bytes, gray } => {
            let color_space = if *gray { "DeviceGray" } else { "DeviceRGB" };
            let stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width,
                    "Height" => height,
                    "ColorSpace" => color_space,
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                bytes.clone(),
            )
            .with_compression(false);
            debug!(width, height, gray, "JPEG image XObject added");
            document.add_object(stream)
        }
        ImageData::Raw { rgb, alpha } => {
            let mut dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            };
            if let Some(alpha) = alpha {
                let mut mask = Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => width,
                        "Height" => height,
                        "ColorSpace" => "DeviceGray",
                        "BitsPerComponent" => 8,
                    },
                    alpha.clone(),
                );
                if let Err(err) = mask.compress() {
                    warn!(%err, "image soft mask left uncompressed");
                }
                dict.set("SMask", document.add_object(mask));
            }
            let mut stream = Stream::new(dict, rgb.clone());
            if let Err(err) = stream.compress() {
                warn!(%err, "image data left uncompressed");
            }
            debug!(width, height, masked = alpha.is_some(), "RGB image XObject added");
            document.add_object(stream)
        }
    }
}
