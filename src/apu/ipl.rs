// IPL ROM - the 64-byte boot program of the audio CPU
//
// While CONTROL ($F1) bit 7 is set, reads of $FFC0-$FFFF return this
// ROM instead of ARAM (writes always land in ARAM). Its program zeroes
// the zero page, announces itself with $AA/$BB on ports 0/1, then
// implements the upload protocol the main CPU drives through the
// mailbox: blocks of bytes acknowledged one by one on port 0, ended by
// a jump to the uploaded entry point.

/// The boot ROM image, overlaid at $FFC0
pub const IPL_ROM: [u8; 64] = [
    0xCD, 0xEF, // MOV X, #$EF
    0xBD, // MOV SP, X
    0xE8, 0x00, // MOV A, #$00
    0xC6, // MOV (X), A       ; clear zero page
    0x1D, // DEC X
    0xD0, 0xFC, // BNE $FFC5
    0x8F, 0xAA, 0xF4, // MOV $F4, #$AA    ; ready handshake
    0x8F, 0xBB, 0xF5, // MOV $F5, #$BB
    0x78, 0xCC, 0xF4, // CMP $F4, #$CC    ; wait for the kick
    0xD0, 0xFB, // BNE $FFCF
    0x2F, 0x19, // BRA $FFEF
    0xEB, 0xF4, // MOV Y, $F4       ; transfer loop
    0xD0, 0xFC, // BNE $FFD5
    0x7E, 0xF4, // CMP Y, $F4
    0xD0, 0x0B, // BNE $FFE9
    0xE4, 0xF5, // MOV A, $F5
    0xCB, 0xF4, // MOV $F4, Y       ; acknowledge
    0xD7, 0x00, // MOV [$00]+Y, A
    0xFC, // INC Y
    0xD0, 0xF3, // BNE $FFD5
    0xAB, 0x01, // INC $01
    0x10, 0xEF, // BPL $FFD5
    0x7E, 0xF4, // CMP Y, $F4
    0x10, 0xEB, // BPL $FFD5
    0xBA, 0xF6, // MOVW YA, $F6     ; next block / entry address
    0xDA, 0x00, // MOVW $00, YA
    0xBA, 0xF4, // MOVW YA, $F4
    0xC4, 0xF4, // MOV $F4, A
    0xDD, // MOV A, Y
    0x5D, // MOV X, A
    0xD0, 0xDB, // BNE $FFD5        ; nonzero command: next block
    0x1F, 0x00, 0x00, // JMP [$0000+X]    ; zero: run the upload
    0xC0, 0xFF, // reset vector -> $FFC0
];

/// Mailbox values the IPL announces when it is ready for an upload
pub const IPL_READY_PORT0: u8 = 0xAA;
pub const IPL_READY_PORT1: u8 = 0xBB;
